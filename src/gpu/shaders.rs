//! Bundled WGSL programs and their validation.
//!
//! Sources are compiled into the binary. Each one is parsed and validated
//! with naga before a pipeline is built from it, so a broken program is
//! reported as [`ShaderError::Compile`] instead of a device-lost panic.

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Particle point-sprite program.
pub const PARTICLES_WGSL: &str = include_str!("shaders/particles.wgsl");
/// Bloom bright-pass extraction.
pub const BLOOM_WGSL: &str = include_str!("shaders/bloom.wgsl");
/// Scene plus blurred mips.
pub const COMPOSITE_WGSL: &str = include_str!("shaders/composite.wgsl");
/// Separable Gaussian blur.
pub const BLUR_WGSL: &str = include_str!("shaders/blur.wgsl");

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{label} failed to compile:\n{message}")]
    Compile { label: &'static str, message: String },
}

/// Parse and validate a WGSL program.
pub fn validate(label: &'static str, source: &str) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        label,
        message: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            label,
            message: e.emit_to_string(source),
        })?;

    log::debug!("Validated shader {}", label);
    Ok(())
}

/// Validate a program and create its shader module.
pub fn create_module(
    device: &wgpu::Device,
    label: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate(label, source)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

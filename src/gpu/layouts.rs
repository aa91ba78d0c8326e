//! Bind group layout builders for GPU pipelines.
//!
//! Provides reusable helpers for creating wgpu bind group layouts.

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages};

/// Builder for creating bind group layouts with common patterns.
pub struct BindGroupLayoutBuilder {
    label: Option<&'static str>,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    /// Create a new bind group layout builder.
    pub fn new(label: &'static str) -> Self {
        Self {
            label: Some(label),
            entries: Vec::new(),
        }
    }

    /// Add a uniform buffer entry.
    pub fn uniform(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Add a 2D texture entry.
    pub fn texture_2d(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        self
    }

    /// Add a filtering sampler entry.
    pub fn sampler(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    /// Build the bind group layout.
    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Particle uniforms, read by both stages.
pub fn create_particle_layout(device: &Device) -> BindGroupLayout {
    BindGroupLayoutBuilder::new("particle_bind_group_layout")
        .uniform(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT)
        .build(device)
}

/// Create a single-source layout (uniforms, texture, sampler).
///
/// Shared by the bright-pass extraction and the blur passes.
pub fn create_source_layout(device: &Device, label: &'static str) -> BindGroupLayout {
    BindGroupLayoutBuilder::new(label)
        .uniform(0, ShaderStages::FRAGMENT)
        .texture_2d(1, ShaderStages::FRAGMENT)
        .sampler(2, ShaderStages::FRAGMENT)
        .build(device)
}

/// Create the composite layout: uniforms, scene, one texture per blur mip, sampler.
pub fn create_composite_layout(device: &Device, mip_count: u32) -> BindGroupLayout {
    let mut builder = BindGroupLayoutBuilder::new("bloom_composite_bind_group_layout")
        .uniform(0, ShaderStages::FRAGMENT)
        .texture_2d(1, ShaderStages::FRAGMENT);
    for mip in 0..mip_count {
        builder = builder.texture_2d(2 + mip, ShaderStages::FRAGMENT);
    }
    builder
        .sampler(2 + mip_count, ShaderStages::FRAGMENT)
        .build(device)
}

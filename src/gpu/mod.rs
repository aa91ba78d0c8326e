//! GPU rendering using wgpu.
//!
//! Provides headless rendering of the particle cloud: an instanced
//! point-sprite pass into an HDR target, followed by a mip-chain bloom
//! composite into an RGBA8 output that can be read back to the CPU.

pub mod bloom;
pub mod composer;
pub mod context;
pub mod layouts;
pub mod particle_pipeline;
pub mod pipelines;
pub mod renderer;
pub mod shaders;
pub mod textures;

pub use bloom::{mip_size, BloomPass, MIP_COUNT};
pub use composer::EffectComposer;
pub use context::{GpuContext, GpuError};
pub use particle_pipeline::{ParticlePipeline, ParticleUniforms};
pub use renderer::{ParticleRenderer, OUTPUT_FORMAT};
pub use shaders::ShaderError;

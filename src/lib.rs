//! Helix Particles
//!
//! GPU-rendered point-cloud particle sketch of a glTF mesh with bloom post-processing.
//!
//! # Features
//!
//! - Mesh loading (glTF / GLB) via gltf, centered on its bounding box
//! - One particle per vertex with random size and color jitter
//! - Additive point-sprite rendering via wgpu, headless
//! - Mip-chain bloom with live threshold / strength / radius controls
//! - Explicit frame loop with stop, play and resize
//! - PNG frame output via image
//!
//! # Limitations
//!
//! Draco-compressed meshes (`KHR_draco_mesh_compression`) are not decoded.
//! Such assets, including the usual compressed `dna.glb` export, fail with
//! [`AssetError::DracoCompressed`] and the sketch moves to its failed phase.
//! Re-export the mesh without Draco compression, or generate one with
//! [`generate_helix`], to render it.

pub mod asset;
pub mod config;
pub mod gpu;
pub mod pipeline;
pub mod scene;
pub mod sketch;

// Re-export commonly used types
pub use asset::{
    generate_helix, load_mesh, load_mesh_from_bytes, AssetError, HelixParams, MeshData,
};
pub use config::{parse_hex_color, CameraConfig, ConfigError, SketchConfig};
pub use gpu::{GpuContext, GpuError, ParticleRenderer, ShaderError};
pub use pipeline::{
    render_frames, render_mesh_frames, PipelineConfig, PipelineError, RenderSummary,
};
pub use scene::{ControlPanel, ParticleBuffer, PerspectiveCamera, SettingKey, Settings};
pub use sketch::{
    Container, Dimensions, FixedContainer, FrameOutcome, FrameRenderer, RenderError, Sketch,
    SketchError, SketchPhase, SkipReason,
};

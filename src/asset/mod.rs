//! Mesh asset loading.
//!
//! This module provides:
//! - glTF / GLB decoding via the `gltf` crate
//! - Bounding-box centering of the decoded positions
//! - Synthetic helix meshes and a minimal GLB encoder

pub mod loader;
pub mod mesh;
pub mod synth;

pub use loader::{load_mesh, load_mesh_from_bytes, AssetError};
pub use mesh::MeshData;
pub use synth::{encode_glb, generate_helix, HelixParams};

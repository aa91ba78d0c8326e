//! Synthetic mesh generation for tests and demos.
//!
//! Produces a double-helix point set shaped like the DNA model and encodes
//! meshes as minimal GLB files readable by [`super::load_mesh_from_bytes`].

use super::MeshData;
use gltf::Glb;
use serde_json::json;
use std::borrow::Cow;
use std::f32::consts::TAU;

/// Parameters for a synthetic double helix.
#[derive(Debug, Clone)]
pub struct HelixParams {
    pub turns: f32,
    /// Samples per strand per full turn.
    pub points_per_turn: u32,
    pub radius: f32,
    /// Height gained per full turn.
    pub pitch: f32,
    /// Place a base-pair rung every N strand samples (0 disables rungs).
    pub rung_every: u32,
    /// Points along each rung, excluding the strand endpoints.
    pub rung_points: u32,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            turns: 3.0,
            points_per_turn: 120,
            radius: 0.6,
            pitch: 1.6,
            rung_every: 10,
            rung_points: 8,
        }
    }
}

/// Generate a double helix running along Y.
pub fn generate_helix(params: &HelixParams) -> MeshData {
    let samples = (params.turns * params.points_per_turn as f32).round() as u32;
    let mut positions = Vec::new();

    for i in 0..samples {
        let t = i as f32 / params.points_per_turn as f32;
        let angle = t * TAU;
        let y = t * params.pitch;

        let a = [params.radius * angle.cos(), y, params.radius * angle.sin()];
        let b = [-a[0], y, -a[2]];
        positions.extend_from_slice(&a);
        positions.extend_from_slice(&b);

        if params.rung_every > 0 && i % params.rung_every == 0 {
            for k in 1..=params.rung_points {
                let f = k as f32 / (params.rung_points + 1) as f32;
                positions.extend_from_slice(&[
                    a[0] + (b[0] - a[0]) * f,
                    y,
                    a[2] + (b[2] - a[2]) * f,
                ]);
            }
        }
    }

    MeshData::new(positions)
}

/// Encode a mesh as a single-primitive POINTS GLB.
///
/// The header length is filled in by the writer.
pub fn encode_glb(mesh: &MeshData) -> Result<Vec<u8>, gltf::Error> {
    let count = mesh.vertex_count();
    let bin: Vec<u8> = bytemuck::cast_slice::<f32, u8>(&mesh.positions[..count * 3]).to_vec();

    let document = match mesh.bounding_box() {
        Some((min, max)) => json!({
            "asset": { "version": "2.0", "generator": "helix-particles" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0, "name": "helix" }],
            "meshes": [{
                "name": "helix",
                "primitives": [{ "attributes": { "POSITION": 0 }, "mode": 0 }]
            }],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": bin.len() }],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": count,
                "type": "VEC3",
                "min": min,
                "max": max
            }]
        }),
        None => json!({
            "asset": { "version": "2.0", "generator": "helix-particles" },
            "scenes": [{ "nodes": [] }],
            "scene": 0
        }),
    };

    let glb = Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: 0,
        },
        json: Cow::Owned(document.to_string().into_bytes()),
        bin: (!bin.is_empty()).then_some(Cow::Owned(bin)),
    };
    glb.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::load_mesh_from_bytes;

    #[test]
    fn test_helix_vertex_count() {
        let params = HelixParams {
            turns: 1.0,
            points_per_turn: 20,
            rung_every: 5,
            rung_points: 3,
            ..Default::default()
        };
        let mesh = generate_helix(&params);
        // 20 samples x 2 strands + 4 rungs x 3 points
        assert_eq!(mesh.vertex_count(), 40 + 12);
    }

    #[test]
    fn test_helix_strands_on_radius() {
        let params = HelixParams {
            rung_every: 0,
            ..Default::default()
        };
        let mesh = generate_helix(&params);
        for p in mesh.positions.chunks_exact(3) {
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!((r - params.radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_glb_container() {
        let glb = encode_glb(&MeshData::new(vec![1.0, 2.0, 3.0])).unwrap();
        let parsed = Glb::from_slice(&glb).unwrap();
        assert_eq!(parsed.header.version, 2);
        assert_eq!(parsed.header.length as usize, glb.len());
        let positions = bytemuck::cast_slice::<f32, u8>(&[1.0, 2.0, 3.0]);
        assert_eq!(parsed.bin.as_deref(), Some(positions));
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_empty_mesh_has_no_bin_chunk() {
        let glb = encode_glb(&MeshData::default()).unwrap();
        assert!(Glb::from_slice(&glb).unwrap().bin.is_none());
    }

    #[test]
    fn test_helix_survives_glb() {
        let mesh = generate_helix(&HelixParams::default());
        let loaded = load_mesh_from_bytes(&encode_glb(&mesh).unwrap()).unwrap();
        assert_eq!(loaded, mesh);
    }
}

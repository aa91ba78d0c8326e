//! glTF / GLB mesh loading using the `gltf` crate.

use super::MeshData;
use gltf::Glb;
use std::borrow::Cow;
use std::path::Path;
use thiserror::Error;

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

/// Errors that can occur during asset loading.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse glTF: {0}")]
    Parse(#[from] gltf::Error),

    #[error("Asset requires KHR_draco_mesh_compression, which this loader cannot decode")]
    DracoCompressed,

    #[error("No mesh found in asset")]
    NoMesh,

    #[error("Mesh primitive has no POSITION attribute")]
    NoPositions,
}

/// Load the first mesh of a glTF / GLB file.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    log::info!("Loading mesh asset {}", path.display());
    let bytes = std::fs::read(path)?;
    load_mesh_from_bytes(&bytes)
}

/// Load the first mesh from in-memory glTF / GLB data.
///
/// The mesh is the first node carrying a mesh in the default scene, searched
/// depth-first, falling back to the first mesh of the document. Positions
/// come from its first primitive; node transforms are not applied.
pub fn load_mesh_from_bytes(data: &[u8]) -> Result<MeshData, AssetError> {
    if required_extensions(data).iter().any(|e| e == DRACO_EXTENSION) {
        return Err(AssetError::DracoCompressed);
    }

    let (document, buffers, _images) = gltf::import_slice(data)?;

    let mesh = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .and_then(|scene| scene.nodes().find_map(|node| first_mesh(&node)))
        .or_else(|| document.meshes().next())
        .ok_or(AssetError::NoMesh)?;

    let primitive = mesh.primitives().next().ok_or(AssetError::NoMesh)?;

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));
    let positions: Vec<f32> = reader
        .read_positions()
        .ok_or(AssetError::NoPositions)?
        .flatten()
        .collect();

    log::debug!(
        "Loaded mesh {:?}: {} vertices",
        mesh.name().unwrap_or("unnamed"),
        positions.len() / 3
    );
    Ok(MeshData::new(positions))
}

fn first_mesh<'a>(node: &gltf::Node<'a>) -> Option<gltf::Mesh<'a>> {
    node.mesh()
        .or_else(|| node.children().find_map(|child| first_mesh(&child)))
}

/// Read `extensionsRequired` from the JSON part of a glTF or GLB file.
fn required_extensions(data: &[u8]) -> Vec<String> {
    let json = json_chunk(data);
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&json) else {
        return Vec::new();
    };
    value
        .get("extensionsRequired")
        .and_then(|v| v.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|e| e.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// JSON chunk of a GLB container, or the data itself for plain glTF.
fn json_chunk(data: &[u8]) -> Cow<'_, [u8]> {
    match Glb::from_slice(data) {
        Ok(glb) => glb.json,
        Err(_) => Cow::Borrowed(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::synth::encode_glb;

    #[test]
    fn test_load_glb_positions() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, -1.0, 0.5, 0.25];
        let glb = encode_glb(&MeshData::new(positions.clone())).unwrap();

        let mesh = load_mesh_from_bytes(&glb).unwrap();
        assert_eq!(mesh.positions, positions);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_draco_required_is_reported() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],
            "extensionsRequired": ["KHR_draco_mesh_compression"]
        }"#;
        assert!(matches!(load_mesh_from_bytes(json), Err(AssetError::DracoCompressed)));
    }

    #[test]
    fn test_draco_required_inside_glb() {
        let json = br#"{
            "asset": { "version": "2.0" },
            "extensionsRequired": ["KHR_draco_mesh_compression"]
        }"#;
        let glb = Glb {
            header: gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                length: 0,
            },
            json: Cow::Borrowed(&json[..]),
            bin: None,
        }
        .to_vec()
        .unwrap();
        assert!(matches!(load_mesh_from_bytes(&glb), Err(AssetError::DracoCompressed)));
    }

    #[test]
    fn test_document_without_mesh() {
        let json = br#"{ "asset": { "version": "2.0" }, "scenes": [{ "nodes": [] }], "scene": 0 }"#;
        assert!(matches!(load_mesh_from_bytes(json), Err(AssetError::NoMesh)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            load_mesh_from_bytes(b"definitely not gltf"),
            Err(AssetError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_mesh(dir.path().join("dna.glb")),
            Err(AssetError::Io(_))
        ));
    }

    #[test]
    fn test_json_chunk_from_glb() {
        let glb = encode_glb(&MeshData::new(vec![0.0; 3])).unwrap();
        let json = json_chunk(&glb);
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["asset"]["version"], "2.0");
    }
}

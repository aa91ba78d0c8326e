//! Particle buffer derived from mesh vertex positions.

use crate::asset::MeshData;
use rand::Rng;

/// Per-particle instance data uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    /// Random size jitter in [0, 1).
    pub size_rnd: f32,
    /// Random color selector in [0, 1).
    pub color_rnd: f32,
}

/// Mesh positions plus one `size_rnd` / `color_rnd` pair per vertex.
#[derive(Debug, Clone, Default)]
pub struct ParticleBuffer {
    positions: Vec<f32>,
    size_rnd: Vec<f32>,
    color_rnd: Vec<f32>,
}

impl ParticleBuffer {
    /// Build particles from a mesh, drawing the random attributes from `rng`.
    pub fn from_mesh<R: Rng + ?Sized>(mesh: &MeshData, rng: &mut R) -> Self {
        let count = mesh.vertex_count();
        let mut size_rnd = Vec::with_capacity(count);
        let mut color_rnd = Vec::with_capacity(count);
        for _ in 0..count {
            size_rnd.push(rng.gen::<f32>());
            color_rnd.push(rng.gen::<f32>());
        }

        Self {
            positions: mesh.positions[..count * 3].to_vec(),
            size_rnd,
            color_rnd,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.size_rnd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size_rnd.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn size_rnd(&self) -> &[f32] {
        &self.size_rnd
    }

    pub fn color_rnd(&self) -> &[f32] {
        &self.color_rnd
    }

    /// Interleave into GPU instances.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.positions
            .chunks_exact(3)
            .zip(self.size_rnd.iter().zip(&self.color_rnd))
            .map(|(p, (&size_rnd, &color_rnd))| ParticleInstance {
                position: [p[0], p[1], p[2]],
                size_rnd,
                color_rnd,
            })
            .collect()
    }
}

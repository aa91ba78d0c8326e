//! Decoded mesh geometry.

/// Flat xyz vertex positions of a single mesh primitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
}

impl MeshData {
    pub fn new(positions: Vec<f32>) -> Self {
        Self { positions }
    }

    /// Number of whole vertices (trailing partial triples are ignored).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut chunks = self.positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in chunks {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }

    /// Translate so the bounding box is centered on the origin.
    ///
    /// Returns the offset that was subtracted.
    pub fn center(&mut self) -> [f32; 3] {
        let Some((min, max)) = self.bounding_box() else {
            return [0.0; 3];
        };
        let offset = [
            (min[0] + max[0]) * 0.5,
            (min[1] + max[1]) * 0.5,
            (min[2] + max[2]) * 0.5,
        ];
        let count = self.vertex_count();
        for p in self.positions[..count * 3].chunks_exact_mut(3) {
            p[0] -= offset[0];
            p[1] -= offset[1];
            p[2] -= offset[2];
        }
        offset
    }
}

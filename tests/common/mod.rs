//! Shared fixtures for integration tests.
#![allow(dead_code)]

use helix_particles::scene::ParticleBuffer;
use helix_particles::sketch::{
    Dimensions, FixedContainer, FrameParams, FrameRenderer, RenderError, Sketch,
};
use helix_particles::{MeshData, SketchConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// CPU renderer that records what the sketch hands it.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub particles: Option<usize>,
    pub sizes: Vec<Dimensions>,
    pub frames: Vec<FrameParams>,
}

impl FrameRenderer for RecordingRenderer {
    fn set_particles(&mut self, particles: &ParticleBuffer) -> Result<(), RenderError> {
        self.particles = Some(particles.vertex_count());
        Ok(())
    }

    fn resize(&mut self, dimensions: Dimensions) {
        self.sizes.push(dimensions);
    }

    fn render(&mut self, frame: &FrameParams) -> Result<(), RenderError> {
        self.frames.push(*frame);
        Ok(())
    }
}

impl RecordingRenderer {
    pub fn last_size(&self) -> Option<Dimensions> {
        self.sizes.last().copied()
    }
}

pub type TestSketch = Sketch<FixedContainer, RecordingRenderer>;

/// A mesh with `floats` position components on a simple ramp.
pub fn mock_mesh(floats: usize) -> MeshData {
    MeshData::new((0..floats).map(|i| (i as f32 * 0.37).sin()).collect())
}

/// Sketch in the loading phase.
pub fn loading_sketch(width: u32, height: u32) -> TestSketch {
    Sketch::new(
        FixedContainer::new(width, height),
        RecordingRenderer::default(),
        SketchConfig::default(),
    )
}

/// Sketch that has received a 300-float mesh.
pub fn ready_sketch(width: u32, height: u32) -> TestSketch {
    let mut sketch = loading_sketch(width, height);
    sketch
        .on_asset_ready_with_rng(mock_mesh(300), &mut StdRng::seed_from_u64(42))
        .expect("asset ready");
    sketch
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {}, got {}",
        expected,
        actual
    );
}

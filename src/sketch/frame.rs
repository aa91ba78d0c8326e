//! Per-frame data handed from the sketch to its renderer.

use super::Dimensions;
use glam::Mat4;

/// Bloom pass parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    /// Luminance above which pixels bloom.
    pub threshold: f32,
    /// Overall bloom multiplier.
    pub strength: f32,
    /// Blend between tight (0) and wide (1) mip contributions.
    pub radius: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            strength: 1.5,
            radius: 0.9,
        }
    }
}

/// Monotonic time accumulator plus the running flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneClock {
    time: f32,
    step: f32,
    playing: bool,
    frames: u64,
}

impl SceneClock {
    pub fn new(step: f32) -> Self {
        Self {
            time: 0.0,
            step,
            playing: true,
            frames: 0,
        }
    }

    /// Advance one frame. Time is `frames * step`, so it does not drift.
    pub fn tick(&mut self) -> f32 {
        self.frames += 1;
        self.time = (self.frames as f64 * self.step as f64) as f32;
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub time: f32,
    pub view_projection: Mat4,
    /// Particle system transform (rotation around Y).
    pub model: Mat4,
    pub bloom: BloomParams,
    pub dimensions: Dimensions,
}

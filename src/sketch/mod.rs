//! The sketch: owned orchestration state driven one frame at a time.
//!
//! A host creates a [`Sketch`] with a container and a renderer, feeds it the
//! loaded mesh through [`Sketch::on_asset_ready`] (or the failure through
//! [`Sketch::on_asset_failed`]) and then calls [`Sketch::advance_frame`] once
//! per display refresh. The sketch holds no timer of its own.

pub mod container;
pub mod frame;

pub use container::{Container, Dimensions, FixedContainer};
pub use frame::{BloomParams, FrameParams, SceneClock};

use crate::asset::{load_mesh, AssetError, MeshData};
use crate::config::SketchConfig;
use crate::gpu::ShaderError;
use crate::scene::{ControlPanel, ParticleBuffer, PerspectiveCamera};
use glam::Mat4;
use rand::Rng;
use std::path::Path;

/// Errors a renderer can report back to the sketch.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),
    #[error("Render called before particles were uploaded")]
    NoParticles,
    #[error("GPU readback failed: {0}")]
    Readback(String),
}

/// Errors surfaced to the host driving the sketch.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    #[error("Asset load failed: {0}")]
    AssetLoadFailed(#[from] AssetError),
    #[error("Shader compile failed: {0}")]
    ShaderCompileFailed(ShaderError),
    #[error("Render failed: {0}")]
    Render(RenderError),
    #[error("Invalid transition: {0}")]
    InvalidTransition(&'static str),
}

impl From<RenderError> for SketchError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Shader(e) => SketchError::ShaderCompileFailed(e),
            other => SketchError::Render(other),
        }
    }
}

/// Drawing backend behind the sketch.
pub trait FrameRenderer {
    /// Upload the particle system. Called once when the asset is ready.
    fn set_particles(&mut self, particles: &ParticleBuffer) -> Result<(), RenderError>;

    /// Resize the surface and post-processing targets.
    fn resize(&mut self, dimensions: Dimensions);

    /// Draw the scene pass followed by the bloom pass.
    fn render(&mut self, frame: &FrameParams) -> Result<(), RenderError>;
}

/// Load progress of the sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchPhase {
    Loading,
    Ready,
    Failed,
}

/// Why a frame opportunity did no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Loading,
    Stopped,
    Failed,
}

/// Result of one call to [`Sketch::advance_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Rendered { time: f32 },
    Skipped(SkipReason),
}

/// State created once the mesh has loaded.
struct LoadedScene {
    controls: ControlPanel,
    particles: ParticleBuffer,
}

/// Point-cloud particle sketch.
pub struct Sketch<C: Container, R: FrameRenderer> {
    container: C,
    renderer: R,
    config: SketchConfig,
    camera: PerspectiveCamera,
    dimensions: Dimensions,
    clock: SceneClock,
    bloom: BloomParams,
    phase: SketchPhase,
    scene: Option<LoadedScene>,
}

impl<C: Container, R: FrameRenderer> Sketch<C, R> {
    /// Size the surface to the container and wait for the asset.
    pub fn new(container: C, mut renderer: R, config: SketchConfig) -> Self {
        let dimensions = container.dimensions();
        let aspect = if dimensions.height > 0 {
            dimensions.width as f32 / dimensions.height as f32
        } else {
            1.0
        };
        let camera = PerspectiveCamera::new(&config.camera, aspect);
        renderer.resize(dimensions.at_least_one());
        log::info!("Sketch created at {}x{}", dimensions.width, dimensions.height);

        Self {
            container,
            renderer,
            clock: SceneClock::new(config.time_step),
            config,
            camera,
            dimensions,
            bloom: BloomParams::default(),
            phase: SketchPhase::Loading,
            scene: None,
        }
    }

    /// Load the mesh file and run the matching transition.
    pub fn load_asset<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SketchError> {
        match load_mesh(path) {
            Ok(mesh) => self.on_asset_ready(mesh),
            Err(err) => Err(self.on_asset_failed(err)),
        }
    }

    /// Finish setup once the mesh is available.
    pub fn on_asset_ready(&mut self, mesh: MeshData) -> Result<(), SketchError> {
        self.on_asset_ready_with_rng(mesh, &mut rand::thread_rng())
    }

    /// As [`Self::on_asset_ready`], drawing the particle jitter from `rng`.
    pub fn on_asset_ready_with_rng<G: Rng + ?Sized>(
        &mut self,
        mut mesh: MeshData,
        rng: &mut G,
    ) -> Result<(), SketchError> {
        if self.phase != SketchPhase::Loading {
            return Err(SketchError::InvalidTransition("asset already handled"));
        }

        mesh.center();
        let controls = ControlPanel::new(self.config.settings);
        let particles = ParticleBuffer::from_mesh(&mesh, rng);

        if let Err(err) = self.renderer.set_particles(&particles) {
            let err = SketchError::from(err);
            log::error!("Particle setup failed: {}", err);
            self.phase = SketchPhase::Failed;
            return Err(err);
        }

        log::info!("Asset ready: {} particles", particles.vertex_count());
        self.scene = Some(LoadedScene { controls, particles });
        self.phase = SketchPhase::Ready;
        self.resize();
        Ok(())
    }

    /// Record a failed load. The session stays failed; nothing is retried.
    ///
    /// Outside [`SketchPhase::Loading`] the phase is left as is and
    /// [`SketchError::InvalidTransition`] is returned.
    pub fn on_asset_failed(&mut self, err: AssetError) -> SketchError {
        if self.phase != SketchPhase::Loading {
            log::warn!("Ignoring asset failure in phase {:?}: {}", self.phase, err);
            return SketchError::InvalidTransition("asset already handled");
        }
        log::error!("Asset load failed: {}", err);
        self.phase = SketchPhase::Failed;
        SketchError::AssetLoadFailed(err)
    }

    /// Halt the loop. Later frames do nothing until [`Self::play`].
    pub fn stop(&mut self) {
        if self.clock.is_playing() {
            log::debug!("Stopped at time {}", self.clock.time());
        }
        self.clock.set_playing(false);
    }

    /// Resume the loop. Returns `false` if it was already running.
    pub fn play(&mut self) -> bool {
        if self.clock.is_playing() {
            return false;
        }
        log::debug!("Resumed at time {}", self.clock.time());
        self.clock.set_playing(true);
        true
    }

    /// Re-read the container size and resize camera, surface and bloom targets.
    pub fn resize(&mut self) {
        self.dimensions = self.container.dimensions();
        self.camera
            .set_viewport(self.dimensions.width, self.dimensions.height);
        self.renderer.resize(self.dimensions.at_least_one());
        log::debug!(
            "Resized to {}x{} (aspect {})",
            self.dimensions.width,
            self.dimensions.height,
            self.camera.aspect
        );
    }

    /// Run one frame of the animation loop.
    pub fn advance_frame(&mut self) -> Result<FrameOutcome, SketchError> {
        let Some(scene) = &self.scene else {
            let reason = match self.phase {
                SketchPhase::Failed => SkipReason::Failed,
                _ => SkipReason::Loading,
            };
            log::trace!("Frame skipped: {:?}", reason);
            return Ok(FrameOutcome::Skipped(reason));
        };
        if self.phase == SketchPhase::Failed {
            return Ok(FrameOutcome::Skipped(SkipReason::Failed));
        }
        if !self.clock.is_playing() {
            log::trace!("Frame skipped: stopped");
            return Ok(FrameOutcome::Skipped(SkipReason::Stopped));
        }

        let time = self.clock.tick();

        let settings = scene.controls.settings();
        self.bloom.threshold = settings.bloom_threshold;
        self.bloom.strength = settings.bloom_strength;
        self.bloom.radius = settings.bloom_radius;

        let frame = FrameParams {
            time,
            view_projection: self.camera.view_projection(),
            model: Mat4::from_rotation_y(self.rotation_y()),
            bloom: self.bloom,
            dimensions: self.dimensions.at_least_one(),
        };

        if let Err(err) = self.renderer.render(&frame) {
            let err = SketchError::from(err);
            if matches!(err, SketchError::ShaderCompileFailed(_)) {
                self.phase = SketchPhase::Failed;
            }
            return Err(err);
        }
        Ok(FrameOutcome::Rendered { time })
    }

    /// Current particle rotation around Y in radians.
    pub fn rotation_y(&self) -> f32 {
        self.clock.time() / self.config.rotation_divisor
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn phase(&self) -> SketchPhase {
        self.phase
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Bloom parameters as of the last rendered frame.
    pub fn bloom(&self) -> BloomParams {
        self.bloom
    }

    /// Slider panel, available once the asset is ready.
    pub fn controls(&self) -> Option<&ControlPanel> {
        self.scene.as_ref().map(|s| &s.controls)
    }

    pub fn controls_mut(&mut self) -> Option<&mut ControlPanel> {
        self.scene.as_mut().map(|s| &mut s.controls)
    }

    pub fn particles(&self) -> Option<&ParticleBuffer> {
        self.scene.as_ref().map(|s| &s.particles)
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable container access, e.g. to emulate a window resize.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SettingKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct RecordingRenderer {
        particles: usize,
        size: Option<Dimensions>,
        frames: Vec<FrameParams>,
        fail_particles: bool,
    }

    impl FrameRenderer for RecordingRenderer {
        fn set_particles(&mut self, particles: &ParticleBuffer) -> Result<(), RenderError> {
            if self.fail_particles {
                return Err(RenderError::Shader(ShaderError::Compile {
                    label: "particles",
                    message: "boom".to_string(),
                }));
            }
            self.particles = particles.vertex_count();
            Ok(())
        }

        fn resize(&mut self, dimensions: Dimensions) {
            self.size = Some(dimensions);
        }

        fn render(&mut self, frame: &FrameParams) -> Result<(), RenderError> {
            self.frames.push(*frame);
            Ok(())
        }
    }

    fn ready_sketch(width: u32, height: u32) -> Sketch<FixedContainer, RecordingRenderer> {
        let mut sketch = Sketch::new(
            FixedContainer::new(width, height),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        let mesh = MeshData::new((0..300).map(|i| i as f32 * 0.01).collect());
        sketch
            .on_asset_ready_with_rng(mesh, &mut StdRng::seed_from_u64(9))
            .unwrap();
        sketch
    }

    #[test]
    fn test_frames_skipped_while_loading() {
        let mut sketch = Sketch::new(
            FixedContainer::new(100, 100),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        assert_eq!(sketch.phase(), SketchPhase::Loading);
        assert!(sketch.controls().is_none());
        assert_eq!(
            sketch.advance_frame().unwrap(),
            FrameOutcome::Skipped(SkipReason::Loading)
        );
        assert_eq!(sketch.time(), 0.0);
    }

    #[test]
    fn test_time_advances_by_step() {
        let mut sketch = ready_sketch(800, 600);
        for n in 1..=20u32 {
            assert_eq!(
                sketch.advance_frame().unwrap(),
                FrameOutcome::Rendered { time: n as f32 * 0.05 }
            );
        }
        assert_eq!(sketch.renderer().frames.len(), 20);
    }

    #[test]
    fn test_rotation_follows_time() {
        let mut sketch = ready_sketch(800, 600);
        for _ in 0..10 {
            sketch.advance_frame().unwrap();
        }
        let expected = sketch.time() / 25.0;
        assert_eq!(sketch.rotation_y(), expected);
        let last = sketch.renderer().frames.last().unwrap();
        assert_eq!(last.model, Mat4::from_rotation_y(expected));
        assert_eq!(last.time, sketch.time());
    }

    #[test]
    fn test_bloom_params_default_before_first_frame() {
        let sketch = ready_sketch(800, 600);
        assert_eq!(sketch.bloom(), BloomParams::default());
    }

    #[test]
    fn test_slider_reaches_bloom_pass() {
        let mut sketch = ready_sketch(800, 600);
        let controls = sketch.controls_mut().unwrap();
        controls.set(SettingKey::BloomStrength, 3.25);
        controls.set(SettingKey::BloomThreshold, 0.5);
        controls.set(SettingKey::BloomRadius, 1.2);
        controls.set(SettingKey::Progress, 0.7);

        sketch.advance_frame().unwrap();
        let bloom = sketch.renderer().frames[0].bloom;
        assert_eq!(bloom.strength, 3.25);
        assert_eq!(bloom.threshold, 0.5);
        assert_eq!(bloom.radius, 1.2);
        assert_eq!(sketch.bloom(), bloom);
    }

    #[test]
    fn test_stop_then_play() {
        let mut sketch = ready_sketch(800, 600);
        sketch.advance_frame().unwrap();
        sketch.advance_frame().unwrap();
        let before = sketch.time();

        sketch.stop();
        for _ in 0..5 {
            assert_eq!(
                sketch.advance_frame().unwrap(),
                FrameOutcome::Skipped(SkipReason::Stopped)
            );
        }
        assert_eq!(sketch.time(), before);

        assert!(sketch.play());
        assert!(!sketch.play());
        assert_eq!(sketch.time(), before);
        sketch.advance_frame().unwrap();
        assert_eq!(sketch.time(), 3.0 * 0.05);
        assert_eq!(sketch.renderer().frames.len(), 3);
    }

    #[test]
    fn test_stop_during_load_holds_loop() {
        let mut sketch = Sketch::new(
            FixedContainer::new(64, 64),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        sketch.stop();
        sketch
            .on_asset_ready(MeshData::new(vec![0.0; 9]))
            .unwrap();
        assert_eq!(
            sketch.advance_frame().unwrap(),
            FrameOutcome::Skipped(SkipReason::Stopped)
        );
        sketch.play();
        assert!(matches!(sketch.advance_frame().unwrap(), FrameOutcome::Rendered { .. }));
    }

    #[test]
    fn test_resize_updates_camera_and_renderer() {
        let mut sketch = ready_sketch(800, 600);
        sketch.container_mut().set_size(1280, 720);
        sketch.resize();

        assert_eq!(sketch.camera().aspect, 1280.0 / 720.0);
        assert_eq!(sketch.dimensions(), Dimensions::new(1280, 720));
        assert_eq!(sketch.renderer().size, Some(Dimensions::new(1280, 720)));

        sketch.advance_frame().unwrap();
        assert_eq!(sketch.renderer().frames[0].dimensions, Dimensions::new(1280, 720));
    }

    #[test]
    fn test_zero_size_container() {
        let mut sketch = ready_sketch(800, 600);
        sketch.container_mut().set_size(0, 0);
        sketch.resize();
        assert_eq!(sketch.camera().aspect, 800.0 / 600.0);
        assert_eq!(sketch.renderer().size, Some(Dimensions::new(1, 1)));
    }

    #[test]
    fn test_asset_failure_is_terminal() {
        let mut sketch = Sketch::new(
            FixedContainer::new(64, 64),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        let err = sketch.on_asset_failed(AssetError::NoMesh);
        assert!(matches!(err, SketchError::AssetLoadFailed(AssetError::NoMesh)));
        assert_eq!(sketch.phase(), SketchPhase::Failed);
        assert_eq!(
            sketch.advance_frame().unwrap(),
            FrameOutcome::Skipped(SkipReason::Failed)
        );
        assert!(matches!(
            sketch.on_asset_ready(MeshData::new(vec![0.0; 3])),
            Err(SketchError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_late_asset_failure_keeps_session_running() {
        let mut sketch = ready_sketch(64, 64);
        sketch.advance_frame().unwrap();

        let err = sketch.on_asset_failed(AssetError::NoMesh);
        assert!(matches!(err, SketchError::InvalidTransition(_)));
        assert_eq!(sketch.phase(), SketchPhase::Ready);
        assert!(matches!(
            sketch.advance_frame().unwrap(),
            FrameOutcome::Rendered { .. }
        ));
    }

    #[test]
    fn test_asset_failure_after_failure_is_rejected() {
        let mut sketch = Sketch::new(
            FixedContainer::new(64, 64),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        sketch.on_asset_failed(AssetError::NoMesh);
        assert!(matches!(
            sketch.on_asset_failed(AssetError::NoPositions),
            SketchError::InvalidTransition(_)
        ));
        assert_eq!(sketch.phase(), SketchPhase::Failed);
    }

    #[test]
    fn test_shader_failure_on_setup() {
        let renderer = RecordingRenderer {
            fail_particles: true,
            ..Default::default()
        };
        let mut sketch =
            Sketch::new(FixedContainer::new(64, 64), renderer, SketchConfig::default());
        let err = sketch.on_asset_ready(MeshData::new(vec![0.0; 3])).unwrap_err();
        assert!(matches!(err, SketchError::ShaderCompileFailed(_)));
        assert_eq!(sketch.phase(), SketchPhase::Failed);
        assert_eq!(
            sketch.advance_frame().unwrap(),
            FrameOutcome::Skipped(SkipReason::Failed)
        );
    }

    #[test]
    fn test_asset_ready_twice_rejected() {
        let mut sketch = ready_sketch(10, 10);
        assert!(matches!(
            sketch.on_asset_ready(MeshData::new(vec![0.0; 3])),
            Err(SketchError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_mesh_is_centered() {
        let mut sketch = Sketch::new(
            FixedContainer::new(10, 10),
            RecordingRenderer::default(),
            SketchConfig::default(),
        );
        sketch
            .on_asset_ready(MeshData::new(vec![2.0, 2.0, 2.0, 4.0, 4.0, 4.0]))
            .unwrap();
        assert_eq!(
            sketch.particles().unwrap().positions(),
            &[-1.0, -1.0, -1.0, 1.0, 1.0, 1.0]
        );
    }
}

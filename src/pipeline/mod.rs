//! Headless render pipeline: load the asset, run the frame loop, write PNGs.

use crate::asset::{load_mesh, AssetError, MeshData};
use crate::config::{ConfigError, SketchConfig};
use crate::gpu::{GpuContext, GpuError, ParticleRenderer};
use crate::sketch::{FixedContainer, FrameOutcome, Sketch, SketchError};
use std::path::{Path, PathBuf};

/// Pipeline configuration for rendering the sketch to a PNG sequence.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sketch: SketchConfig,
    pub width: u32,
    pub height: u32,
    /// Number of frames to advance and save.
    pub frames: u32,
    pub output_dir: PathBuf,
    /// Stop the loop after this many frames, then play again.
    ///
    /// Skipped frames are still saved, so the pause shows as repeated images.
    pub pause: Option<PauseWindow>,
}

/// Frames `[start, start + length)` are requested while stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseWindow {
    pub start: u32,
    pub length: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sketch: SketchConfig::default(),
            width: 800,
            height: 600,
            frames: 60,
            output_dir: PathBuf::from("frames"),
            pause: None,
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Sketch error: {0}")]
    Sketch(#[from] SketchError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Frame buffer does not match {width}x{height}")]
    FrameSize { width: u32, height: u32 },
}

impl From<AssetError> for PipelineError {
    fn from(err: AssetError) -> Self {
        PipelineError::Sketch(SketchError::AssetLoadFailed(err))
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub frames_written: u32,
    pub frames_rendered: u32,
    pub final_time: f32,
    pub particles: usize,
}

/// File name of frame `index` inside the output directory.
pub fn frame_file_name(index: u32) -> String {
    format!("frame_{:05}.png", index)
}

/// Render frames of the mesh at `asset_path` into `config.output_dir`.
pub async fn render_frames<P: AsRef<Path>>(
    asset_path: P,
    config: PipelineConfig,
    progress_callback: Option<Box<dyn Fn(f32) + Send>>,
) -> Result<RenderSummary, PipelineError> {
    let mesh = load_mesh(asset_path)?;
    render_mesh_frames(mesh, config, progress_callback).await
}

/// As [`render_frames`], with an already loaded mesh.
pub async fn render_mesh_frames(
    mesh: MeshData,
    config: PipelineConfig,
    progress_callback: Option<Box<dyn Fn(f32) + Send>>,
) -> Result<RenderSummary, PipelineError> {
    config.sketch.validate()?;
    std::fs::create_dir_all(&config.output_dir)?;

    let gpu_context = GpuContext::new().await?;
    let renderer = ParticleRenderer::new(gpu_context, &config.sketch)?;
    let container = FixedContainer::new(config.width, config.height);
    let mut sketch = Sketch::new(container, renderer, config.sketch.clone());
    sketch.on_asset_ready(mesh)?;

    let particles = sketch.particles().map_or(0, |p| p.vertex_count());
    log::info!(
        "Rendering {} frames of {} particles at {}x{}",
        config.frames,
        particles,
        config.width,
        config.height
    );

    let mut frames_rendered = 0;
    for frame_idx in 0..config.frames {
        if let Some(pause) = config.pause {
            if frame_idx == pause.start {
                sketch.stop();
            } else if frame_idx == pause.start.saturating_add(pause.length) {
                sketch.play();
            }
        }

        if let FrameOutcome::Rendered { .. } = sketch.advance_frame()? {
            frames_rendered += 1;
        }

        let pixels = sketch.renderer().read_pixels().map_err(SketchError::from)?;
        let (width, height) = sketch.renderer().size();
        let image = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or(PipelineError::FrameSize { width, height })?;
        image.save(config.output_dir.join(frame_file_name(frame_idx)))?;

        if let Some(ref callback) = progress_callback {
            callback((frame_idx + 1) as f32 / config.frames as f32);
        }
    }

    Ok(RenderSummary {
        frames_written: config.frames,
        frames_rendered,
        final_time: sketch.time(),
        particles,
    })
}

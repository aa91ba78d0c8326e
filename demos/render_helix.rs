//! Example: Render the particle helix to a PNG sequence.
//!
//! Uses the given glTF / GLB asset, or a generated DNA helix when none is
//! passed. An optional second argument is a JSON sketch configuration.
//!
//! Run with:
//!     RUST_LOG=info cargo run --example render_helix --features tokio -- [asset.glb] [config.json]

use anyhow::Context;
use helix_particles::asset::{generate_helix, load_mesh, HelixParams};
use helix_particles::pipeline::{render_mesh_frames, PauseWindow, PipelineConfig};
use helix_particles::SketchConfig;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_path = args.next().map(PathBuf::from);
    let sketch = match args.next() {
        Some(path) => SketchConfig::from_json_file(&path)
            .with_context(|| format!("reading sketch config {}", path))?,
        None => SketchConfig::default(),
    };

    println!("Helix Particles - Render Example");
    println!("================================\n");

    let mesh = match &asset_path {
        Some(path) => {
            println!("Loading asset: {}", path.display());
            load_mesh(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => {
            println!("No asset given, generating a DNA helix");
            generate_helix(&HelixParams::default())
        }
    };
    println!("  Vertices: {}\n", mesh.vertex_count());

    let config = PipelineConfig {
        sketch,
        width: 800,
        height: 600,
        frames: 90,
        output_dir: PathBuf::from("helix_frames"),
        // Hold for half a second to show stop / play
        pause: Some(PauseWindow {
            start: 45,
            length: 15,
        }),
    };
    let output_dir = config.output_dir.clone();

    println!("Rendering {} frames at {}x{}...", config.frames, config.width, config.height);
    let progress: Box<dyn Fn(f32) + Send> = Box::new(|fraction: f32| {
        let percent = (fraction * 100.0).round() as u32;
        if percent % 10 == 0 {
            println!("  Progress: {}%", percent);
        }
    });

    let summary = render_mesh_frames(mesh, config, Some(progress)).await?;

    println!("\nDone! {} frames in {}", summary.frames_written, output_dir.display());
    println!("  Rendered: {}", summary.frames_rendered);
    println!("  Final time: {:.2}", summary.final_time);
    println!("  Particles: {}", summary.particles);

    Ok(())
}

//! Headless particle renderer.

use super::{
    composer::EffectComposer,
    context::{GpuContext, GpuError},
    particle_pipeline::{ParticlePipeline, ParticleUniforms},
    textures::ReadbackBuffer,
};
use crate::config::SketchConfig;
use crate::scene::ParticleBuffer;
use crate::sketch::{Dimensions, FrameParams, FrameRenderer, RenderError};
use wgpu::{BindGroup, Buffer};

/// Output pixel format read back by [`ParticleRenderer::read_pixels`].
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU state that exists once particles are uploaded.
struct ParticleSet {
    pipeline: ParticlePipeline,
    bind_group: BindGroup,
    instances: Option<Buffer>,
    count: u32,
}

/// Headless particle renderer: scene pass into an offscreen target, bloom, readback.
pub struct ParticleRenderer {
    ctx: GpuContext,
    composer: EffectComposer,
    particles: Option<ParticleSet>,
    colors: [[f32; 3]; 3],
    clear: [f32; 3],
    point_size: f32,
    frames_rendered: u64,
}

impl ParticleRenderer {
    /// Create a renderer with 1x1 targets. The sketch resizes it to its container.
    ///
    /// Fails with [`GpuError::Shader`] if a bloom program does not compile.
    pub fn new(ctx: GpuContext, config: &SketchConfig) -> Result<Self, GpuError> {
        let colors = config.base_colors()?;
        let clear = config.clear_rgb()?;
        let composer = EffectComposer::new(&ctx.device, &ctx.queue, 1, 1, OUTPUT_FORMAT)?;

        Ok(Self {
            ctx,
            composer,
            particles: None,
            colors,
            clear,
            point_size: config.point_size,
            frames_rendered: 0,
        })
    }

    /// Current surface size.
    pub fn size(&self) -> (u32, u32) {
        self.composer.size()
    }

    pub fn width(&self) -> u32 {
        self.size().0
    }

    pub fn height(&self) -> u32 {
        self.size().1
    }

    /// Number of particles drawn per frame.
    pub fn particle_count(&self) -> u32 {
        self.particles.as_ref().map_or(0, |p| p.count)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn composer(&self) -> &EffectComposer {
        &self.composer
    }

    /// Get GPU adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }

    /// Copy the last composited frame to the CPU as tightly packed RGBA8 rows.
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let output = self.composer.output();
        let readback = ReadbackBuffer::new(&self.ctx.device, output.width(), output.height());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        readback.copy_from(&mut encoder, output);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        readback.read_pixels(&self.ctx.device)
    }

    fn uniforms(&self, frame: &FrameParams) -> ParticleUniforms {
        let width = frame.dimensions.width as f32;
        let height = frame.dimensions.height as f32;
        let rgba = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];

        ParticleUniforms {
            view_proj: frame.view_projection.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            resolution: [width, height, 1.0 / width, 1.0 / height],
            color1: rgba(self.colors[0]),
            color2: rgba(self.colors[1]),
            color3: rgba(self.colors[2]),
            time: frame.time,
            point_size: self.point_size,
            _padding: [0.0; 2],
        }
    }
}

impl FrameRenderer for ParticleRenderer {
    fn set_particles(&mut self, particles: &ParticleBuffer) -> Result<(), RenderError> {
        let device = &self.ctx.device;
        let pipeline = ParticlePipeline::new(device, self.composer.scene_format())?;
        let bind_group = pipeline.create_bind_group(device);
        let instances = ParticlePipeline::create_instance_buffer(device, &particles.instances());

        if instances.is_none() {
            log::warn!("Mesh has no vertices; only the background will render");
        }
        self.particles = Some(ParticleSet {
            pipeline,
            bind_group,
            instances,
            count: particles.vertex_count() as u32,
        });
        Ok(())
    }

    fn resize(&mut self, dimensions: Dimensions) {
        let dimensions = dimensions.at_least_one();
        self.composer.set_size(
            &self.ctx.device,
            &self.ctx.queue,
            dimensions.width,
            dimensions.height,
        );
    }

    fn render(&mut self, frame: &FrameParams) -> Result<(), RenderError> {
        let set = self.particles.as_ref().ok_or(RenderError::NoParticles)?;

        let uniforms = self.uniforms(frame);
        self.ctx
            .queue
            .write_buffer(&set.pipeline.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        let clear = wgpu::Color {
            r: self.clear[0] as f64,
            g: self.clear[1] as f64,
            b: self.clear[2] as f64,
            a: 1.0,
        };
        self.composer.render(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            clear,
            frame.bloom,
            |pass| {
                if let Some(instances) = &set.instances {
                    pass.set_pipeline(&set.pipeline.pipeline);
                    pass.set_bind_group(0, &set.bind_group, &[]);
                    pass.set_vertex_buffer(0, instances.slice(..));
                    // Draw 4 vertices per particle (triangle strip quad)
                    pass.draw(0..4, 0..set.count);
                }
            },
        );

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        self.frames_rendered += 1;
        Ok(())
    }
}

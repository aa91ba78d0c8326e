//! Particle rendering pipeline.

use super::layouts::create_particle_layout;
use super::pipelines::{create_pipeline_layout, RenderPipelineBuilder, ADDITIVE_BLEND};
use super::shaders::{self, ShaderError};
use crate::scene::ParticleInstance;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, TextureFormat};

/// Uniform data passed to shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// width, height, 1/width, 1/height
    pub resolution: [f32; 4],
    pub color1: [f32; 4],
    pub color2: [f32; 4],
    pub color3: [f32; 4],
    pub time: f32,
    /// Diameter in pixels at unit view distance.
    pub point_size: f32,
    pub _padding: [f32; 2],
}

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32];

/// Particle rendering pipeline.
pub struct ParticlePipeline {
    pub pipeline: RenderPipeline,
    pub bind_group_layout: BindGroupLayout,
    pub uniform_buffer: Buffer,
}

impl ParticlePipeline {
    /// Compile the particle program and create a pipeline targeting `format`.
    pub fn new(device: &Device, format: TextureFormat) -> Result<Self, ShaderError> {
        let shader = shaders::create_module(device, "particle_shader", shaders::PARTICLES_WGSL)?;

        let bind_group_layout = create_particle_layout(device);
        let pipeline_layout =
            create_pipeline_layout(device, "particle_pipeline_layout", &[&bind_group_layout]);

        let pipeline = RenderPipelineBuilder::new("particle_pipeline", &shader)
            .layout(&pipeline_layout)
            .vertex_buffers(vec![wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &INSTANCE_ATTRIBUTES,
            }])
            .format(format)
            .blend(ADDITIVE_BLEND)
            .topology(wgpu::PrimitiveTopology::TriangleStrip)
            .build(device);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_uniforms"),
            size: std::mem::size_of::<ParticleUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
        })
    }

    /// Create a bind group for this pipeline.
    pub fn create_bind_group(&self, device: &Device) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particle_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            }],
        })
    }

    /// Upload per-particle attributes. `None` for an empty cloud.
    pub fn create_instance_buffer(
        device: &Device,
        instances: &[ParticleInstance],
    ) -> Option<Buffer> {
        if instances.is_empty() {
            return None;
        }
        Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_instances"),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        }))
    }
}

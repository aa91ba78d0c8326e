//! Mip-chain bloom.
//!
//! Implements a multi-pass bloom effect:
//! 1. Extract pixels brighter than the threshold from the rendered scene
//! 2. Blur them down a chain of half-resolution mips, each with a wider kernel
//! 3. Composite the weighted mips on top of the original scene

use super::layouts::{create_composite_layout, create_source_layout};
use super::pipelines::{create_fullscreen_pipeline, create_pipeline_layout};
use super::shaders::{self, ShaderError};
use super::textures::RenderTarget;
use crate::sketch::BloomParams;
use wgpu::{
    BindGroupLayout, Buffer, Device, Queue, RenderPipeline, Sampler, TextureFormat, TextureView,
};

/// Number of blur mips.
pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius per mip. Sigma equals the radius.
const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Intermediate format for the bright pass and blur mips.
pub const HDR_FORMAT: TextureFormat = TextureFormat::Rgba16Float;

/// Uniform data for blur pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    direction: [f32; 2],
    texel_size: [f32; 2],
    kernel_radius: u32,
    sigma: f32,
    _padding: [f32; 2],
}

/// Uniform data for bloom extraction/composition.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BloomUniforms {
    threshold: f32,
    strength: f32,
    radius: f32,
    _padding: f32,
}

impl From<BloomParams> for BloomUniforms {
    fn from(params: BloomParams) -> Self {
        Self {
            threshold: params.threshold,
            strength: params.strength,
            radius: params.radius,
            _padding: 0.0,
        }
    }
}

/// Bytes written to the extract and composite uniform buffers for one frame.
fn bloom_uniform_bytes(params: BloomParams) -> [u8; 16] {
    bytemuck::cast(BloomUniforms::from(params))
}

impl BlurUniforms {
    /// Uniforms for one direction of blur mip `level`.
    fn for_mip(level: usize, width: u32, height: u32, direction: [f32; 2]) -> Self {
        let (mip_width, mip_height) = mip_size(width, height, level as u32);
        let radius = KERNEL_RADII[level];
        Self {
            direction,
            texel_size: [1.0 / mip_width as f32, 1.0 / mip_height as f32],
            kernel_radius: radius,
            sigma: radius as f32,
            _padding: [0.0; 2],
        }
    }
}

/// Size of blur mip `level` for a `width` x `height` surface.
///
/// Mip 0 is half resolution; each level halves again, never below one pixel.
pub fn mip_size(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shift = (level + 1).min(31);
    ((width >> shift).max(1), (height >> shift).max(1))
}

/// One level of the blur chain.
///
/// All passes are recorded into one encoder, so each direction owns its
/// uniform buffer.
struct BlurMip {
    horizontal: RenderTarget,
    vertical: RenderTarget,
    horizontal_uniforms: Buffer,
    vertical_uniforms: Buffer,
}

impl BlurMip {
    fn new(device: &Device, queue: &Queue, level: usize, width: u32, height: u32) -> Self {
        let (mip_width, mip_height) = mip_size(width, height, level as u32);

        let target = |label: &str| {
            RenderTarget::for_scene(device, label, mip_width, mip_height, HDR_FORMAT)
        };
        let horizontal = target("bloom_mip_horizontal");
        let vertical = target("bloom_mip_vertical");

        let make_uniforms = |label: &'static str, direction: [f32; 2]| {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BlurUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let uniforms = BlurUniforms::for_mip(level, width, height, direction);
            queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniforms));
            buffer
        };

        Self {
            horizontal_uniforms: make_uniforms("blur_uniforms_horizontal", [1.0, 0.0]),
            vertical_uniforms: make_uniforms("blur_uniforms_vertical", [0.0, 1.0]),
            horizontal,
            vertical,
        }
    }
}

/// Bloom pass: bright-pass extraction, mip blur chain, composite.
pub struct BloomPass {
    extract_pipeline: RenderPipeline,
    blur_pipeline: RenderPipeline,
    composite_pipeline: RenderPipeline,

    extract_bind_group_layout: BindGroupLayout,
    blur_bind_group_layout: BindGroupLayout,
    composite_bind_group_layout: BindGroupLayout,

    bright: RenderTarget,
    mips: Vec<BlurMip>,

    extract_uniform_buffer: Buffer,
    composite_uniform_buffer: Buffer,

    sampler: Sampler,
    width: u32,
    height: u32,
}

impl BloomPass {
    /// Compile the bloom programs and allocate targets for `width` x `height`.
    pub fn new(
        device: &Device,
        queue: &Queue,
        width: u32,
        height: u32,
        output_format: TextureFormat,
    ) -> Result<Self, ShaderError> {
        let bloom_shader = shaders::create_module(device, "bloom_shader", shaders::BLOOM_WGSL)?;
        let blur_shader = shaders::create_module(device, "blur_shader", shaders::BLUR_WGSL)?;
        let composite_shader =
            shaders::create_module(device, "composite_shader", shaders::COMPOSITE_WGSL)?;

        let extract_bind_group_layout =
            create_source_layout(device, "bloom_extract_bind_group_layout");
        let blur_bind_group_layout = create_source_layout(device, "blur_bind_group_layout");
        let composite_bind_group_layout = create_composite_layout(device, MIP_COUNT as u32);

        let extract_pipeline = create_fullscreen_pipeline(
            device,
            "bloom_extract_pipeline",
            &create_pipeline_layout(
                device,
                "bloom_extract_pipeline_layout",
                &[&extract_bind_group_layout],
            ),
            &bloom_shader,
            "fs_extract",
            HDR_FORMAT,
        );
        let blur_pipeline = create_fullscreen_pipeline(
            device,
            "blur_pipeline",
            &create_pipeline_layout(device, "blur_pipeline_layout", &[&blur_bind_group_layout]),
            &blur_shader,
            "fs_main",
            HDR_FORMAT,
        );
        let composite_pipeline = create_fullscreen_pipeline(
            device,
            "bloom_composite_pipeline",
            &create_pipeline_layout(
                device,
                "bloom_composite_pipeline_layout",
                &[&composite_bind_group_layout],
            ),
            &composite_shader,
            "fs_composite",
            output_format,
        );

        let make_uniforms = |label: &'static str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BloomUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let extract_uniform_buffer = make_uniforms("bloom_extract_uniforms");
        let composite_uniform_buffer = make_uniforms("bloom_composite_uniforms");

        // Linear filtering for smooth upsampling of the small mips
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let (bright, mips) = Self::create_targets(device, queue, width, height);

        Ok(Self {
            extract_pipeline,
            blur_pipeline,
            composite_pipeline,
            extract_bind_group_layout,
            blur_bind_group_layout,
            composite_bind_group_layout,
            bright,
            mips,
            extract_uniform_buffer,
            composite_uniform_buffer,
            sampler,
            width,
            height,
        })
    }

    fn create_targets(
        device: &Device,
        queue: &Queue,
        width: u32,
        height: u32,
    ) -> (RenderTarget, Vec<BlurMip>) {
        let bright = RenderTarget::for_scene(device, "bloom_bright", width, height, HDR_FORMAT);
        let mips = (0..MIP_COUNT)
            .map(|level| BlurMip::new(device, queue, level, width, height))
            .collect();
        (bright, mips)
    }

    /// Reallocate the bright-pass target and every mip for a new surface size.
    pub fn set_size(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        let (bright, mips) = Self::create_targets(device, queue, width, height);
        self.bright = bright;
        self.mips = mips;
        self.width = width;
        self.height = height;
    }

    /// Current target size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sizes of the blur mips, largest first.
    pub fn mip_sizes(&self) -> Vec<(u32, u32)> {
        self.mips
            .iter()
            .map(|mip| (mip.vertical.width(), mip.vertical.height()))
            .collect()
    }

    /// Record bloom of `scene_view` into `output_view`.
    pub fn apply(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        scene_view: &TextureView,
        output_view: &TextureView,
        params: BloomParams,
    ) {
        let uniforms = bloom_uniform_bytes(params);
        queue.write_buffer(&self.extract_uniform_buffer, 0, &uniforms);
        queue.write_buffer(&self.composite_uniform_buffer, 0, &uniforms);

        // Step 1: Extract bright areas from scene -> bright
        let extract_bind_group = self.source_bind_group(
            device,
            "bloom_extract_bind_group",
            &self.extract_bind_group_layout,
            &self.extract_uniform_buffer,
            scene_view,
        );
        fullscreen_pass(
            encoder,
            "bloom_extract_pass",
            self.bright.view(),
            &self.extract_pipeline,
            &extract_bind_group,
        );

        // Step 2: Blur down the mip chain, each level reading the previous one
        let mut input = self.bright.view();
        for mip in &self.mips {
            let horizontal = self.source_bind_group(
                device,
                "blur_bind_group_horizontal",
                &self.blur_bind_group_layout,
                &mip.horizontal_uniforms,
                input,
            );
            fullscreen_pass(
                encoder,
                "blur_pass_horizontal",
                mip.horizontal.view(),
                &self.blur_pipeline,
                &horizontal,
            );

            let vertical = self.source_bind_group(
                device,
                "blur_bind_group_vertical",
                &self.blur_bind_group_layout,
                &mip.vertical_uniforms,
                mip.horizontal.view(),
            );
            fullscreen_pass(
                encoder,
                "blur_pass_vertical",
                mip.vertical.view(),
                &self.blur_pipeline,
                &vertical,
            );

            input = mip.vertical.view();
        }

        // Step 3: Composite weighted mips with original scene -> output
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: self.composite_uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(scene_view),
            },
        ];
        for (i, mip) in self.mips.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 2 + i as u32,
                resource: wgpu::BindingResource::TextureView(mip.vertical.view()),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: 2 + MIP_COUNT as u32,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });
        let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom_composite_bind_group"),
            layout: &self.composite_bind_group_layout,
            entries: &entries,
        });
        fullscreen_pass(
            encoder,
            "bloom_composite_pass",
            output_view,
            &self.composite_pipeline,
            &composite_bind_group,
        );
    }

    fn source_bind_group(
        &self,
        device: &Device,
        label: &'static str,
        layout: &BindGroupLayout,
        uniforms: &Buffer,
        source: &TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Draw one fullscreen triangle into `target`.
fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &'static str,
    target: &TextureView,
    pipeline: &RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            depth_slice: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}

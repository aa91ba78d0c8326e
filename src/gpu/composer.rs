//! Two-pass frame composition: scene render, then bloom.

use super::bloom::{BloomPass, HDR_FORMAT};
use super::shaders::ShaderError;
use super::textures::RenderTarget;
use crate::sketch::BloomParams;
use wgpu::{Device, Queue, TextureFormat};

/// Owns the offscreen scene target, the bloom pass and the final output.
pub struct EffectComposer {
    scene: RenderTarget,
    output: RenderTarget,
    bloom: BloomPass,
    output_format: TextureFormat,
}

impl EffectComposer {
    pub fn new(
        device: &Device,
        queue: &Queue,
        width: u32,
        height: u32,
        output_format: TextureFormat,
    ) -> Result<Self, ShaderError> {
        Ok(Self {
            scene: RenderTarget::for_scene(device, "scene_target", width, height, HDR_FORMAT),
            output: RenderTarget::for_output(device, "output_target", width, height, output_format),
            bloom: BloomPass::new(device, queue, width, height, output_format)?,
            output_format,
        })
    }

    /// Format the scene pass renders into.
    pub fn scene_format(&self) -> TextureFormat {
        HDR_FORMAT
    }

    /// Resize every target. A no-op when the size is unchanged.
    pub fn set_size(&mut self, device: &Device, queue: &Queue, width: u32, height: u32) {
        if (width, height) == self.size() {
            return;
        }
        self.scene = RenderTarget::for_scene(device, "scene_target", width, height, HDR_FORMAT);
        self.output =
            RenderTarget::for_output(device, "output_target", width, height, self.output_format);
        self.bloom.set_size(device, queue, width, height);
        log::debug!("Composer resized to {}x{}", width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.output.width(), self.output.height())
    }

    pub fn bloom(&self) -> &BloomPass {
        &self.bloom
    }

    /// Final composited image.
    pub fn output(&self) -> &RenderTarget {
        &self.output
    }

    /// Record the scene pass (cleared to `clear`, drawn by `draw_scene`)
    /// followed by the bloom pass into the output target.
    pub fn render<F>(
        &self,
        device: &Device,
        queue: &Queue,
        encoder: &mut wgpu::CommandEncoder,
        clear: wgpu::Color,
        bloom: BloomParams,
        draw_scene: F,
    ) where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.scene.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            draw_scene(&mut pass);
        }

        self.bloom.apply(
            device,
            queue,
            encoder,
            self.scene.view(),
            self.output.view(),
            bloom,
        );
    }
}

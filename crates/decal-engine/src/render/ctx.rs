use crate::coords::Viewport;
use crate::device::Gpu;

use super::OffscreenTarget;

/// Renderer-facing context (GPU + target formats + viewport).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub gpu: &'a Gpu,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub viewport: Viewport, // physical px of the target
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(gpu: &'a Gpu, target: &OffscreenTarget) -> Self {
        Self {
            gpu,
            color_format: target.format(),
            depth_format: target.depth_format(),
            viewport: target.viewport(),
        }
    }

    #[inline]
    pub fn device(&self) -> &'a wgpu::Device {
        self.gpu.device()
    }
}

/// Target for drawing (encoder + attachments).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub depth_view: Option<&'a wgpu::TextureView>,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, target: &'a OffscreenTarget) -> Self {
        Self {
            encoder,
            color_view: target.color_view(),
            depth_view: target.depth_view(),
        }
    }
}

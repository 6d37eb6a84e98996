use crate::coords::Viewport;
use crate::device::Gpu;

use super::RenderError;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Off-screen color target (plus optional depth) owned by one component.
///
/// The color texture can be copied from (readback) and written to (seeding
/// with prior content).
pub struct OffscreenTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: Option<(wgpu::Texture, wgpu::TextureView)>,
    format: wgpu::TextureFormat,
    viewport: Viewport,
}

impl OffscreenTarget {
    /// Allocates a target, checking the size against the device limit first.
    pub fn new(
        gpu: &Gpu,
        label: &str,
        viewport: Viewport,
        format: wgpu::TextureFormat,
        with_depth: bool,
    ) -> Result<Self, RenderError> {
        let limit = gpu.max_texture_dimension();
        if viewport.width > limit || viewport.height > limit {
            return Err(RenderError::TargetTooLarge {
                width: viewport.width,
                height: viewport.height,
                limit,
            });
        }

        let size = viewport.extent();
        let color = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = with_depth.then(|| {
            let depth = gpu.device().create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let view = depth.create_view(&wgpu::TextureViewDescriptor::default());
            (depth, view)
        });

        Ok(Self {
            color,
            color_view,
            depth,
            format,
            viewport,
        })
    }

    /// Whether this target can be reused for `viewport`.
    #[inline]
    pub fn matches(&self, viewport: Viewport) -> bool {
        self.viewport == viewport
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    pub fn depth_format(&self) -> Option<wgpu::TextureFormat> {
        self.depth.as_ref().map(|_| DEPTH_FORMAT)
    }

    #[inline]
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    #[inline]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    #[inline]
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(|(_, v)| v)
    }

    /// Overwrites the whole color texture with tightly packed RGBA8 rows.
    pub fn upload_rgba8(&self, gpu: &Gpu, rgba: &[u8]) {
        let size = self.viewport.extent();
        gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            size,
        );
    }
}

/// Reuses `slot` when it already matches `viewport`, otherwise replaces it.
///
/// The superseded target is dropped (its GPU memory released) before the new
/// one is allocated.
pub(crate) fn ensure_target<'t>(
    slot: &'t mut Option<OffscreenTarget>,
    gpu: &Gpu,
    label: &str,
    viewport: Viewport,
    format: wgpu::TextureFormat,
    with_depth: bool,
) -> Result<&'t OffscreenTarget, RenderError> {
    let reusable = slot
        .as_ref()
        .is_some_and(|t| t.matches(viewport) && t.format() == format);
    if !reusable {
        if let Some(old) = slot.take() {
            log::debug!(
                "{label}: reallocating {}x{} -> {}x{}",
                old.viewport().width,
                old.viewport().height,
                viewport.width,
                viewport.height
            );
        }
    }

    let target = match slot.take() {
        Some(target) => target,
        None => OffscreenTarget::new(gpu, label, viewport, format, with_depth)?,
    };
    Ok(slot.insert(target))
}

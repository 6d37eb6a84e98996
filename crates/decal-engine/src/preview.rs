//! Snapshot of what the camera sees, drawn with the scene's own materials.

use crate::coords::Viewport;
use crate::device::Gpu;
use crate::pixels::PixelBuffer;
use crate::render::{
    encode_pass, ensure_target, read_rgba8, scene_items, OffscreenTarget, PassParams, RenderCtx,
    RenderError, RenderTarget, ShaderLibrary,
};
use crate::session::Session;

// sRGB target: shaders work in linear, readback yields display bytes.
const PREVIEW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Renders the session's scene unlit, textured, at the viewport size.
#[derive(Default)]
pub struct PreviewRenderer {
    library: ShaderLibrary,
    target: Option<OffscreenTarget>,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(None)` if the session has no scene or camera.
    pub async fn render(
        &mut self,
        gpu: &Gpu,
        session: &Session,
    ) -> Result<Option<PixelBuffer>, RenderError> {
        let (Some(scene), Some(camera)) = (session.scene(), session.camera()) else {
            return Ok(None);
        };
        let viewport: Viewport = session.viewport();
        if !viewport.is_valid() {
            return Ok(None);
        }

        let target = ensure_target(
            &mut self.target,
            gpu,
            "decal-engine preview target",
            viewport,
            PREVIEW_FORMAT,
            true,
        )?;

        let items = scene_items(scene);
        let ctx = RenderCtx::new(gpu, target);
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("decal-engine preview encoder"),
            });
        let draws = {
            let mut rt = RenderTarget::new(&mut encoder, target);
            encode_pass(
                &ctx,
                &mut self.library,
                &mut rt,
                &PassParams {
                    camera,
                    decal_rect: None,
                    clear: Some(wgpu::Color::TRANSPARENT),
                },
                &items,
            )
        };
        gpu.queue().submit(std::iter::once(encoder.finish()));
        log::debug!("preview: {draws} draws at {}x{}", viewport.width, viewport.height);

        let pixels = read_rgba8(gpu, target.color_texture(), (0, 0), viewport.width, viewport.height).await?;
        Ok(Some(pixels))
    }
}

//! UV-space decal baking.
//!
//! The target drawable is rasterized in texture space; each fragment looks up
//! where its surface point lands on screen and samples the decal image there
//! if that point is inside the placement rectangle. The result is a texture
//! in the drawable's UV layout.

mod config;
mod error;
mod source;

use std::sync::Arc;

use image::RgbaImage;
use image::imageops::FilterType;

pub use config::{BakerConfig, ProjectionMode};
pub use error::BakeError;
pub use source::{ImageLoadError, ImageSource};

use source::SourceSlot;

use crate::coords::{PlacementRect, Viewport};
use crate::device::Gpu;
use crate::pixels::PixelBuffer;
use crate::render::{
    encode_pass, ensure_target, read_rgba8, DrawItem, OffscreenTarget, PassParams, RenderCtx,
    RenderTarget, ShaderLibrary,
};
use crate::scene::{DrawableHandle, Material};
use crate::session::Session;
use crate::texture::{ColorSpace, Texture2d, TextureHandle};

const BAKE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const BAKE_TARGET_LABEL: &str = "decal-engine bake target";

/// One bake: which surface, which image, where it sits on screen and how
/// large the output texture is.
#[derive(Debug, Clone)]
pub struct BakeRequest {
    pub target: DrawableHandle,
    /// Material slot whose index range is baked.
    pub slot: usize,
    pub source: ImageSource,
    /// Placement in viewport pixels, top-left origin.
    pub rect: PlacementRect,
    pub output: Viewport,
    /// Prior texture content; discarded texels keep it. Resized to `output`
    /// when the sizes differ.
    pub base: Option<RgbaImage>,
}

impl BakeRequest {
    pub fn new(
        target: DrawableHandle,
        source: impl Into<ImageSource>,
        rect: PlacementRect,
        output: Viewport,
    ) -> Self {
        Self {
            target,
            slot: 0,
            source: source.into(),
            rect,
            output,
            base: None,
        }
    }

    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_base(mut self, base: RgbaImage) -> Self {
        self.base = Some(base);
        self
    }
}

/// Bakes decals into texture space.
///
/// Owns its bake target and the cached decal source texture.
pub struct DecalBaker {
    config: BakerConfig,
    library: ShaderLibrary,
    target: Option<OffscreenTarget>,
    source: SourceSlot<TextureHandle>,
}

impl DecalBaker {
    pub fn new(config: BakerConfig) -> Self {
        Self {
            config,
            library: ShaderLibrary::new(config.filter),
            target: None,
            source: SourceSlot::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &BakerConfig {
        &self.config
    }

    /// Switches projection mode for later bakes.
    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.config.mode = mode;
    }

    /// Texture of the most recently loaded decal image.
    pub fn source_texture(&self) -> Option<&TextureHandle> {
        self.source.current()
    }

    pub fn target_size(&self) -> Option<Viewport> {
        self.target.as_ref().map(OffscreenTarget::viewport)
    }

    /// Renders the decal into the UV layout of `request.target`.
    ///
    /// The session viewport is set to the output size for the duration of the
    /// render and restored on every exit path. Image load failures happen
    /// before any GPU or session state changes.
    pub async fn bake(
        &mut self,
        gpu: &Gpu,
        session: &mut Session,
        request: BakeRequest,
    ) -> Result<PixelBuffer, BakeError> {
        let BakeRequest {
            target: handle,
            slot,
            source,
            rect,
            output,
            base,
        } = request;

        // ── validation ────────────────────────────────────────────────────

        let camera = *session.camera().ok_or(BakeError::NotConfigured)?;
        let scene = session.scene().ok_or(BakeError::NotConfigured)?;
        let drawable = scene.get(handle).ok_or(BakeError::UnknownDrawable(handle))?;
        let range = drawable
            .geometry
            .slot_range(slot)
            .ok_or(BakeError::UnknownSlot { slot })?;

        let limit = gpu.max_texture_dimension();
        if !output.is_valid() || output.width > limit || output.height > limit {
            return Err(BakeError::InvalidOutputSize {
                width: output.width,
                height: output.height,
                limit,
            });
        }
        if rect.is_empty() || !rect.is_finite() {
            return Err(BakeError::EmptyPlacement);
        }

        // Normalized against the live viewport, not the output size.
        let decal_rect = rect.to_decal_rect(session.viewport());

        let mut geometry = drawable.geometry.clone();
        if self.config.mode.needs_normals() && geometry.normals().is_none() {
            geometry = Arc::new(geometry.with_computed_normals());
        }
        let transform = drawable.transform;
        let label = drawable.name.clone();

        // ── decal source ──────────────────────────────────────────────────

        let ticket = self.source.begin();
        let image = source.decode().await?;
        let texture =
            Texture2d::from_rgba8(gpu, "decal-engine decal source", &image, ColorSpace::Linear)?;
        if !self.source.install(ticket, texture.clone()) {
            return Err(BakeError::Superseded);
        }

        // ── render ────────────────────────────────────────────────────────

        let staged = session.swap_viewport(output);
        log::info!(
            "baking {label} slot {slot} ({:?}) at {}x{}",
            self.config.mode,
            output.width,
            output.height
        );

        let target = ensure_target(
            &mut self.target,
            gpu,
            BAKE_TARGET_LABEL,
            staged.viewport(),
            BAKE_FORMAT,
            false,
        )?;

        let clear = match base {
            Some(base) => {
                let base = if base.dimensions() == (output.width, output.height) {
                    base
                } else {
                    image::imageops::resize(&base, output.width, output.height, FilterType::Triangle)
                };
                target.upload_rgba8(gpu, base.as_raw());
                None
            }
            None => Some(wgpu::Color::TRANSPARENT),
        };

        let projector = Material::new("decal projector")
            .with_variant(self.config.mode.variant())
            .with_diffuse(Some(texture))
            .with_double_sided(true);

        let items = [DrawItem {
            label: &label,
            geometry: &geometry,
            transform,
            ranges: vec![(range, Arc::new(projector))],
        }];

        let ctx = RenderCtx::new(gpu, target);
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("decal-engine bake encoder"),
            });
        {
            let mut rt = RenderTarget::new(&mut encoder, target);
            encode_pass(
                &ctx,
                &mut self.library,
                &mut rt,
                &PassParams {
                    camera: &camera,
                    decal_rect: Some(decal_rect),
                    clear,
                },
                &items,
            );
        }
        gpu.queue().submit(std::iter::once(encoder.finish()));

        let pixels = read_rgba8(gpu, target.color_texture(), (0, 0), output.width, output.height).await?;

        drop(staged);
        Ok(pixels)
    }
}

impl Default for DecalBaker {
    fn default() -> Self {
        Self::new(BakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_select_projector_variants() {
        use crate::scene::ShaderVariant;
        assert_eq!(ProjectionMode::Unlit.variant(), ShaderVariant::UnlitDecalProjector);
        assert_eq!(ProjectionMode::Lit.variant(), ShaderVariant::LitDecalProjector);
        assert!(ProjectionMode::Lit.needs_normals());
        assert!(!ProjectionMode::Unlit.needs_normals());
    }

    #[test]
    fn request_defaults_to_slot_zero_without_base() {
        let r = BakeRequest::new(
            DrawableHandle(0),
            Vec::<u8>::new(),
            PlacementRect::default(),
            Viewport::new(512, 512),
        );
        assert_eq!(r.slot, 0);
        assert!(r.base.is_none());
        assert_eq!(r.with_slot(2).slot, 2);
    }
}

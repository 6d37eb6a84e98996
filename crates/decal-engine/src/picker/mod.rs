//! GPU color-id picking.
//!
//! Every visible drawable is drawn with a flat color encoding a per-pick id
//! into an off-screen target; the pixel under the pointer is read back and
//! decoded.

mod color_id;
mod config;
mod error;

use std::sync::Arc;

pub use color_id::{ColorId, ColorIdMap};
pub use config::{OutlineRule, PickerConfig};
pub use error::PickError;

use crate::coords::{FramebufferOrigin, Viewport};
use crate::device::Gpu;
use crate::render::{
    encode_pass, ensure_target, read_rgba8_blocking, scene_items, OffscreenTarget, PassParams,
    RenderCtx, RenderTarget, ShaderLibrary,
};
use crate::scene::{DrawableHandle, Material, ShaderVariant};
use crate::session::Session;
use crate::substitute::Substitution;

const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const PICK_TARGET_LABEL: &str = "decal-engine pick target";
/// The picking target is a wgpu texture, addressed top row first.
const PICK_ORIGIN: FramebufferOrigin = FramebufferOrigin::TopLeft;

/// Resolves screen pixels to drawables.
///
/// Owns its picking target, sized to the viewport seen at the most recent
/// pick.
pub struct Picker {
    config: PickerConfig,
    library: ShaderLibrary,
    target: Option<OffscreenTarget>,
}

impl Picker {
    pub fn new(config: PickerConfig) -> Self {
        Self {
            config,
            library: ShaderLibrary::default(),
            target: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Size of the current picking target, if one was allocated.
    pub fn target_size(&self) -> Option<Viewport> {
        self.target.as_ref().map(OffscreenTarget::viewport)
    }

    /// Returns the drawable visible at screen pixel `(x, y)` (top-left
    /// origin), or `None` for background, outlines, discarded texels and
    /// coordinates outside the viewport.
    ///
    /// The scene's material bindings are identical before and after the call,
    /// whatever the outcome.
    pub fn pick(
        &mut self,
        gpu: &Gpu,
        session: &mut Session,
        x: u32,
        y: u32,
    ) -> Result<Option<DrawableHandle>, PickError> {
        let (scene, camera, viewport) = session.stage_mut().ok_or(PickError::NotConfigured)?;
        if !viewport.is_valid() {
            return Ok(None);
        }

        let target = ensure_target(
            &mut self.target,
            gpu,
            PICK_TARGET_LABEL,
            viewport,
            PICK_FORMAT,
            true,
        )?;

        if !viewport.contains(x, y) {
            log::debug!("pick ({x}, {y}) outside {}x{}", viewport.width, viewport.height);
            return Ok(None);
        }

        let ids = {
            let mut sub = Substitution::begin(scene);
            let ids = assign_flat_ids(&mut sub, &self.config)?;

            let ctx = RenderCtx::new(gpu, target);
            let mut encoder = gpu
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("decal-engine pick encoder"),
                });
            let items = scene_items(sub.scene());
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
            log::debug!("pick pass: {} ids, {draws} draws", ids.len());

            // Originals are back once `sub` drops.
            ids
        };

        let row = PICK_ORIGIN.row(y, viewport.height);
        let pixel = read_rgba8_blocking(gpu, target.color_texture(), (x, row), 1, 1)?;
        let Some([r, g, b, _]) = pixel.pixel(0, 0) else {
            return Ok(None);
        };

        let id = ColorId::from_rgb([r, g, b]);
        let hit = ids.get(id);
        log::debug!("pick ({x}, {y}) -> id {} -> {hit:?}", id.get());
        Ok(hit)
    }
}

impl Default for Picker {
    fn default() -> Self {
        Self::new(PickerConfig::default())
    }
}

/// Swaps every visible drawable to flat-id materials, ids in traversal order.
fn assign_flat_ids(
    sub: &mut Substitution<'_>,
    config: &PickerConfig,
) -> Result<ColorIdMap, PickError> {
    let handles: Vec<_> = sub.scene().traverse_visible().map(|(h, _)| h).collect();

    let mut ids = ColorIdMap::new();
    for handle in handles {
        let color = ids.assign(handle)?.to_color();
        sub.replace_with(handle, |original| {
            Arc::new(flat_id_material(original, color, config))
        });
    }
    Ok(ids)
}

/// The pick-pass stand-in for one original material.
fn flat_id_material(original: &Material, color: [f32; 4], config: &PickerConfig) -> Material {
    if !original.is_visible() || config.outline.is_outline(original) {
        return Material::invisible().with_variant(ShaderVariant::FlatId);
    }

    Material::new(original.name())
        .with_variant(ShaderVariant::FlatId)
        .with_base_color(color)
        .with_alpha_cutoff(original.alpha_cutoff())
        .with_diffuse(original.diffuse().cloned())
        .with_double_sided(original.is_double_sided())
}

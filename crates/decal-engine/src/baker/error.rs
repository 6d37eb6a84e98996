use thiserror::Error;

use crate::render::RenderError;
use crate::scene::DrawableHandle;

use super::ImageLoadError;

#[derive(Debug, Error)]
pub enum BakeError {
    #[error("baker needs a scene and a camera")]
    NotConfigured,

    #[error("drawable {0:?} is not in the scene")]
    UnknownDrawable(DrawableHandle),

    #[error("drawable has no geometry for material slot {slot}")]
    UnknownSlot { slot: usize },

    #[error("output size {width}x{height} must be non-zero and at most {limit}")]
    InvalidOutputSize { width: u32, height: u32, limit: u32 },

    #[error("placement rectangle is empty or not finite")]
    EmptyPlacement,

    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),

    #[error("a newer decal image replaced this one while it was loading")]
    Superseded,

    #[error(transparent)]
    Render(#[from] RenderError),
}

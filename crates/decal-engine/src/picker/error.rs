use thiserror::Error;

use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("picker needs a scene and a camera")]
    NotConfigured,

    #[error(transparent)]
    Render(#[from] RenderError),
}

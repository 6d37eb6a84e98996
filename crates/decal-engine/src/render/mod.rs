//! GPU rendering subsystem.
//!
//! Draws scene geometry with one of the fixed shader variants into
//! off-screen targets and reads the results back.
//!
//! Convention:
//! - Targets are top-left origin; texel row 0 is the top row.
//! - Geometry is uploaded per call; pipelines are cached per target format.

mod ctx;
mod error;
mod mesh;
mod pass;
mod readback;
mod shader;
mod target;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
pub use readback::{read_rgba8, read_rgba8_blocking};
pub use shader::ShaderLibrary;
pub use target::OffscreenTarget;

pub(crate) use pass::{encode_pass, scene_items, DrawItem, PassParams};
pub(crate) use target::ensure_target;

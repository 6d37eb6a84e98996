//! Decal engine crate.
//!
//! GPU picking and UV-space decal baking over a host-owned scene:
//! - `picker`: which drawable is under a screen pixel
//! - `baker`: project a screen-space image into a drawable's texture space
//! - `substitute`: temporary material swaps that always revert

pub mod device;
pub mod logging;

pub mod baker;
pub mod coords;
pub mod picker;
pub mod pixels;
pub mod preview;
pub mod render;
pub mod scene;
pub mod session;
pub mod substitute;
pub mod texture;
pub mod uv_grid;

pub use baker::{BakeError, BakeRequest, BakerConfig, DecalBaker, ImageSource, ProjectionMode};
pub use coords::{DecalRect, FramebufferOrigin, PlacementRect, Viewport};
pub use device::{Gpu, GpuInit};
pub use picker::{OutlineRule, PickError, Picker, PickerConfig};
pub use pixels::PixelBuffer;
pub use session::Session;

//! Coordinate types shared by the picker, the baker and the host.
//!
//! Canonical screen space:
//! - Physical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Decal space is the viewport normalized to `[0, 1]` with +Y up, matching the
//! way clip space is mapped to the screen.

mod rect;
mod viewport;

pub use rect::{DecalRect, PlacementRect};
pub use viewport::{FramebufferOrigin, Viewport};

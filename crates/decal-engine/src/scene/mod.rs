//! Scene model borrowed by the picker and the baker.
//!
//! Responsibilities:
//! - CPU geometry with UVs and optional normals/groups
//! - materials exposed through a fixed capability set
//! - ordered drawables with stable handles
//! - the host camera

mod camera;
mod drawable;
mod geometry;
mod graph;
mod material;

pub use camera::{Camera, Projection};
pub use drawable::{Drawable, DrawableHandle};
pub use geometry::{Geometry, GeometryError, Group};
pub use graph::Scene;
pub use material::{Material, MaterialSlots, ShaderVariant};

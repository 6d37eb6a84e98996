use std::ops::Range;
use std::sync::Arc;

use glam::Mat4;

use super::{Geometry, Material, MaterialSlots};

/// Opaque reference to a drawable in a [`Scene`](super::Scene).
///
/// Handles are positions in the scene's ordered drawable list and stay valid
/// while the scene topology is unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableHandle(pub(crate) usize);

impl DrawableHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A renderable scene node: geometry, material binding, name, visibility and
/// world transform.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub materials: MaterialSlots,
    pub visible: bool,
    pub transform: Mat4,
}

impl Drawable {
    pub fn new(
        name: impl Into<String>,
        geometry: impl Into<Arc<Geometry>>,
        materials: impl Into<MaterialSlots>,
    ) -> Self {
        Self {
            name: name.into(),
            geometry: geometry.into(),
            materials: materials.into(),
            visible: true,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Index ranges to draw with the material bound to each.
    ///
    /// A single material covers the whole index buffer. Multi-slot bindings
    /// draw each group with its slot; groups whose slot is missing are
    /// skipped. Multi-slot bindings without groups draw everything with slot 0.
    pub fn draw_ranges(&self) -> Vec<(Range<u32>, &Arc<Material>)> {
        let whole = 0..self.geometry.index_count();
        match &self.materials {
            MaterialSlots::Single(m) => vec![(whole, m)],
            MaterialSlots::Multi(ms) if self.geometry.groups().is_empty() => {
                ms.first().map(|m| (whole, m)).into_iter().collect()
            }
            MaterialSlots::Multi(ms) => self
                .geometry
                .groups()
                .iter()
                .filter_map(|g| ms.get(g.material_index).map(|m| (g.range(), m)))
                .collect(),
        }
    }
}

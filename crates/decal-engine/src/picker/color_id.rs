use std::collections::HashMap;

use crate::render::RenderError;
use crate::scene::DrawableHandle;

/// 24-bit pick id packed into the RGB channels of a pixel.
///
/// R carries bits 16..24, G bits 8..16 and B bits 0..8. Zero is the
/// background and never assigned to a drawable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(u32);

impl ColorId {
    pub const BACKGROUND: Self = Self(0);
    pub const MAX: Self = Self(0x00FF_FFFF);

    /// Returns `None` for values that do not fit in 24 bits.
    #[inline]
    pub const fn new(value: u32) -> Option<Self> {
        if value <= Self::MAX.0 { Some(Self(value)) } else { None }
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_background(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn to_rgb(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    #[inline]
    pub const fn from_rgb(rgb: [u8; 3]) -> Self {
        Self(((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32)
    }

    /// Opaque linear color whose 8-bit unorm encoding is exactly `to_rgb`.
    pub fn to_color(self) -> [f32; 4] {
        let [r, g, b] = self.to_rgb();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }
}

/// Ids assigned to drawables for one pick, in traversal order.
#[derive(Debug, Default)]
pub struct ColorIdMap {
    by_id: HashMap<ColorId, DrawableHandle>,
    next: u32,
}

impl ColorIdMap {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            next: 1,
        }
    }

    /// Assigns the next id to `handle`.
    pub fn assign(&mut self, handle: DrawableHandle) -> Result<ColorId, RenderError> {
        let id = ColorId::new(self.next.max(1)).ok_or(RenderError::IdSpaceExhausted {
            count: self.by_id.len() + 1,
        })?;
        self.by_id.insert(id, handle);
        self.next = id.get() + 1;
        Ok(id)
    }

    /// Drawable for `id`; the background and unknown ids map to nothing.
    pub fn get(&self, id: ColorId) -> Option<DrawableHandle> {
        if id.is_background() {
            return None;
        }
        self.by_id.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorId, DrawableHandle)> + '_ {
        self.by_id.iter().map(|(id, h)| (*id, *h))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

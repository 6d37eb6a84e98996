use glam::Vec2;

use super::Viewport;

/// Decal placement in screen pixels (top-left origin), as produced by the
/// host's drag widget.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacementRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PlacementRect {
    /// The widget's initial placement: a 128 px square, 128 px in from the
    /// top-left corner.
    fn default() -> Self {
        Self::new(128.0, 128.0, 128.0, 128.0)
    }
}

impl PlacementRect {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering the whole viewport.
    #[inline]
    pub fn full(viewport: Viewport) -> Self {
        Self::new(0.0, 0.0, viewport.width as f32, viewport.height as f32)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut r = self;
        if r.width < 0.0 {
            r.x += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.y += r.height;
            r.height = -r.height;
        }
        r
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.x && p.y >= r.y && p.x < r.x + r.width && p.y < r.y + r.height
    }

    /// Keeps the height and adapts the width to an image's aspect ratio, the
    /// way the widget reacts to a newly dropped image.
    pub fn fit_aspect(self, image_width: u32, image_height: u32) -> Self {
        if image_width == 0 || image_height == 0 {
            return self;
        }
        let aspect = image_width as f32 / image_height as f32;
        Self {
            width: self.height * aspect,
            ..self
        }
    }

    /// Centers the rectangle horizontally in the viewport; `y` is kept.
    pub fn centered_horizontally(self, viewport: Viewport) -> Self {
        Self {
            x: (viewport.width as f32 - self.width) * 0.5,
            ..self
        }
    }

    /// Normalizes into decal space using the *viewport* size (not the bake
    /// output size). Y is flipped: screen +Y runs down, decal space +Y up.
    pub fn to_decal_rect(self, viewport: Viewport) -> DecalRect {
        let w = viewport.width.max(1) as f32;
        let h = viewport.height.max(1) as f32;
        DecalRect {
            min: Vec2::new(self.x / w, 1.0 - self.y / h),
            max: Vec2::new((self.x + self.width) / w, 1.0 - (self.y + self.height) / h),
        }
    }
}

/// Placement rectangle in `[0, 1]` decal space.
///
/// `min` is the top-left corner of the placement and `max` the bottom-right,
/// so `min.y > max.y` for a regular (non-flipped) placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecalRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl DecalRect {
    /// Maps a point in `[0, 1]` screen space (+Y up) to rectangle-relative UV.
    ///
    /// The result is in `[0, 1]²` exactly when the point is inside the
    /// placement; V grows downward like image rows.
    #[inline]
    pub fn remap(self, screen: Vec2) -> Vec2 {
        (screen - self.min) / (self.max - self.min)
    }

    #[inline]
    pub fn contains(self, screen: Vec2) -> bool {
        let uv = self.remap(screen);
        (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
    }

    /// Packed as `(min.x, min.y, max.x, max.y)` for the projector uniform.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

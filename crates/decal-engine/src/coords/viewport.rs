/// Viewport size in physical pixels.
///
/// This is the size of the host's live drawable area. The picker sizes its
/// target from it and the baker normalizes placement rectangles by it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height; 1.0 for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Whether a screen pixel (top-left origin) lies inside the viewport.
    #[inline]
    pub fn contains(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width.max(1),
            height: self.height.max(1),
            depth_or_array_layers: 1,
        }
    }
}

/// Where row 0 of a render target lives.
///
/// wgpu textures are addressed top-left first, so screen rows map straight to
/// texel rows. Backends with a bottom-left framebuffer origin need the flip.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FramebufferOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

impl FramebufferOrigin {
    /// Converts a top-left screen row into a framebuffer row.
    #[inline]
    pub fn row(self, screen_y: u32, height: u32) -> u32 {
        match self {
            Self::TopLeft => screen_y,
            Self::BottomLeft => height.saturating_sub(1).saturating_sub(screen_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let vp = Viewport::new(4, 3);
        assert!(vp.contains(0, 0));
        assert!(vp.contains(3, 2));
        assert!(!vp.contains(4, 0));
        assert!(!vp.contains(0, 3));
    }

    #[test]
    fn bottom_left_origin_flips_rows() {
        assert_eq!(FramebufferOrigin::BottomLeft.row(0, 480), 479);
        assert_eq!(FramebufferOrigin::BottomLeft.row(479, 480), 0);
        assert_eq!(FramebufferOrigin::TopLeft.row(10, 480), 10);
    }

    #[test]
    fn degenerate_viewport_aspect() {
        assert_eq!(Viewport::new(10, 0).aspect(), 1.0);
        assert!(!Viewport::new(10, 0).is_valid());
    }
}

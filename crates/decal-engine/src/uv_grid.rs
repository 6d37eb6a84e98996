//! Procedural UV test texture.
//!
//! Shown on the selected drawable so its UV layout is visible, and handy as a
//! stand-in decal.

use image::{Rgba, RgbaImage};

/// Cells per side.
pub const CELLS: u32 = 8;

const LIGHT: [u8; 4] = [230, 230, 230, 255];
const DARK: [u8; 4] = [40, 40, 40, 255];

/// Checkerboard tinted by UV: red grows with U, green with V (downward).
pub fn generate(size: u32) -> RgbaImage {
    let size = size.max(CELLS);
    let cell = size / CELLS;

    RgbaImage::from_fn(size, size, |x, y| {
        let base = if ((x / cell) + (y / cell)) % 2 == 0 { LIGHT } else { DARK };
        let u = x as f32 / (size - 1) as f32;
        let v = y as f32 / (size - 1) as f32;
        Rgba([
            mix(base[0], u),
            mix(base[1], v),
            base[2],
            base[3],
        ])
    })
}

// Blends a channel halfway toward full intensity by `t`.
fn mix(channel: u8, t: f32) -> u8 {
    let c = channel as f32;
    (c + (255.0 - c) * 0.5 * t).round() as u8
}

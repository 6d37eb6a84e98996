//! CPU-side image results.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;

/// Tightly packed RGBA8 pixels, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// `data` must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * 4);
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of one pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn to_image(&self) -> RgbaImage {
        self.clone().into_image()
    }

    pub fn into_image(self) -> RgbaImage {
        let (w, h) = (self.width, self.height);
        // Length is checked on construction.
        RgbaImage::from_raw(w, h, self.data).unwrap_or_else(|| RgbaImage::new(w, h))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)
    }
}

/// Default export name: the current time in unix milliseconds.
pub fn timestamped_png_name() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!("{millis}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_one() -> PixelBuffer {
        PixelBuffer::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8])
    }

    #[test]
    fn pixel_indexes_rows_from_top() {
        let b = two_by_one();
        assert_eq!(b.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(b.pixel(2, 0), None);
        assert_eq!(b.pixel(0, 1), None);
    }

    #[test]
    fn converts_to_image() {
        let img = two_by_one().into_image();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        two_by_one().save_png(&path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.get_pixel(1, 0).0, [5, 6, 7, 8]);
    }

    #[test]
    fn timestamped_name_is_png() {
        let name = timestamped_png_name();
        assert_eq!(name.extension().and_then(|e| e.to_str()), Some("png"));
    }
}

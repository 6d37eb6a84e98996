use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageReader, RgbaImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("image has no pixels")]
    Empty,
}

/// Where a decal image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded file contents (PNG, JPEG, ...), e.g. from a drop handler.
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Reads and decodes the image into RGBA8.
    ///
    /// File reads go through `tokio::fs` and decoding runs on the blocking
    /// pool, so this must be awaited inside a tokio runtime.
    pub async fn decode(self) -> Result<RgbaImage, ImageLoadError> {
        let bytes = match self {
            Self::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| ImageLoadError::Io { path, source })?,
            Self::Bytes(bytes) => bytes,
        };
        if bytes.is_empty() {
            return Err(ImageLoadError::Empty);
        }

        let image = tokio::task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map(|img| img.to_rgba8())
        })
        .await??;

        if image.width() == 0 || image.height() == 0 {
            return Err(ImageLoadError::Empty);
        }
        Ok(image)
    }

    /// Width and height from the image header, without decoding pixels.
    pub fn dimensions(&self) -> Result<(u32, u32), ImageLoadError> {
        let size = match self {
            Self::Path(path) => ImageReader::open(path)
                .and_then(|r| r.with_guessed_format())
                .map_err(|source| ImageLoadError::Io {
                    path: path.clone(),
                    source,
                })?
                .into_dimensions()?,
            Self::Bytes(bytes) => ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .map_err(image::ImageError::IoError)?
                .into_dimensions()?,
        };
        Ok(size)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Single cached value replaced last-writer-wins.
///
/// Each load takes a ticket first; installing with a ticket older than the
/// newest one is refused, so a slow load can never overwrite a newer one.
#[derive(Debug)]
pub(crate) struct SourceSlot<T> {
    generation: u64,
    current: Option<T>,
}

impl<T> Default for SourceSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
        }
    }
}

impl<T> SourceSlot<T> {
    pub(crate) fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Replaces (and drops) the current value if `ticket` is the newest.
    pub(crate) fn install(&mut self, ticket: u64, value: T) -> bool {
        if ticket != self.generation {
            return false;
        }
        self.current = Some(value);
        true
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn decodes_bytes() {
        let img = ImageSource::Bytes(png_bytes(3, 2)).decode().await.unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[tokio::test]
    async fn decodes_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decal.png");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();
        let img = ImageSource::Path(path).decode().await.unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = ImageSource::Path(PathBuf::from("/definitely/not/here.png"))
            .decode()
            .await
            .unwrap_err();
        assert!(matches!(err, ImageLoadError::Io { .. }));
    }

    #[tokio::test]
    async fn garbage_is_a_decode_error() {
        let err = ImageSource::Bytes(b"not an image".to_vec()).decode().await.unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode(_)));
        let err = ImageSource::Bytes(Vec::new()).decode().await.unwrap_err();
        assert!(matches!(err, ImageLoadError::Empty));
    }

    #[test]
    fn dimensions_read_the_header() {
        assert_eq!(ImageSource::Bytes(png_bytes(7, 5)).dimensions().unwrap(), (7, 5));
    }

    #[test]
    fn stale_tickets_cannot_install() {
        let mut slot = SourceSlot::default();
        let slow = slot.begin();
        let fast = slot.begin();
        assert!(slot.install(fast, "new"));
        assert!(!slot.install(slow, "old"));
        assert_eq!(slot.current(), Some(&"new"));
    }
}

//! Sampled 2D textures (material diffuse maps and decal sources).

use std::sync::Arc;

use image::RgbaImage;

use crate::device::Gpu;
use crate::render::RenderError;

/// How the stored bytes should be interpreted when sampled.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color data authored in sRGB (glTF base color maps). Stored as sRGB so
    /// shaders see linear values.
    #[default]
    Srgb,
    /// Bytes are passed through untouched.
    Linear,
}

/// GPU texture plus its sampling view.
///
/// The storage format follows the color space: `Rgba8UnormSrgb` for color
/// maps so decoding happens in the sampler, `Rgba8Unorm` for raw data. No
/// reinterpreting views are created, which keeps GL backends usable.
#[derive(Debug)]
pub struct Texture2d {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
    color_space: ColorSpace,
}

/// Shared texture reference; materials and the decal source slot hold these.
pub type TextureHandle = Arc<Texture2d>;

impl ColorSpace {
    #[inline]
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

impl Texture2d {
    /// Uploads an RGBA8 image.
    ///
    /// Images with a zero or over-limit side are rejected before anything is
    /// allocated.
    pub fn from_rgba8(
        gpu: &Gpu,
        label: &str,
        image: &RgbaImage,
        color_space: ColorSpace,
    ) -> Result<TextureHandle, RenderError> {
        let (width, height) = image.dimensions();
        let limit = gpu.max_texture_dimension();
        if width == 0 || height == 0 || width > limit || height > limit {
            return Err(RenderError::TextureTooLarge {
                width,
                height,
                limit,
            });
        }
        Ok(Self::upload(gpu, label, image, color_space))
    }

    /// 1×1 texture of a single color.
    pub fn solid(gpu: &Gpu, label: &str, rgba: [u8; 4], color_space: ColorSpace) -> TextureHandle {
        Self::upload(gpu, label, &RgbaImage::from_pixel(1, 1, image::Rgba(rgba)), color_space)
    }

    fn upload(gpu: &Gpu, label: &str, image: &RgbaImage, color_space: ColorSpace) -> TextureHandle {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            ..Default::default()
        });

        Arc::new(Self {
            texture,
            view,
            width,
            height,
            color_space,
        })
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_format_follows_color_space() {
        assert_eq!(ColorSpace::Srgb.format(), wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(ColorSpace::Linear.format(), wgpu::TextureFormat::Rgba8Unorm);
        assert!(!ColorSpace::Linear.format().is_srgb());
    }
}

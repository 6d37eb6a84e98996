use crate::device::Gpu;
use crate::pixels::PixelBuffer;

use super::RenderError;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch wgpu requires for texture-to-buffer copies.
pub(crate) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a mapped copy buffer.
pub(crate) fn strip_row_padding(mapped: &[u8], width: u32, height: u32, padded: u32) -> Vec<u8> {
    let row_bytes = (width * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * padded as usize;
        pixels.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    pixels
}

/// Copies a region of an RGBA8 texture into a tightly packed buffer.
///
/// Row 0 of the result is the top row of the region. Awaits the buffer map;
/// the device is polled to completion before awaiting so the future resolves
/// without an external driver.
pub async fn read_rgba8(
    gpu: &Gpu,
    texture: &wgpu::Texture,
    origin: (u32, u32),
    width: u32,
    height: u32,
) -> Result<PixelBuffer, RenderError> {
    let padded = padded_bytes_per_row(width);

    let staging = gpu.device().create_buffer(&wgpu::BufferDescriptor {
        label: Some("decal-engine readback"),
        size: u64::from(padded) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("decal-engine readback encoder"),
        });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: origin.0,
                y: origin.1,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    gpu.queue().submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = tokio::sync::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    gpu.device().poll(wgpu::PollType::wait_indefinitely())?;
    rx.await.map_err(|_| RenderError::ReadbackDropped)??;

    let mapped = slice.get_mapped_range();
    let data = strip_row_padding(&mapped, width, height, padded);
    drop(mapped);
    staging.unmap();

    Ok(PixelBuffer::new(width, height, data))
}

/// Blocking variant of [`read_rgba8`] for callers outside an async context.
pub fn read_rgba8_blocking(
    gpu: &Gpu,
    texture: &wgpu::Texture,
    origin: (u32, u32),
    width: u32,
    height: u32,
) -> Result<PixelBuffer, RenderError> {
    pollster::block_on(read_rgba8(gpu, texture, origin, width, height))
}

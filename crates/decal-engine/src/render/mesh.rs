use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::Geometry;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Interleaves a geometry's channels. Missing normals become zero vectors.
pub(crate) fn interleave(geometry: &Geometry) -> Vec<MeshVertex> {
    let normals = geometry.normals();
    geometry
        .positions()
        .iter()
        .zip(geometry.uvs())
        .enumerate()
        .map(|(i, (&position, &uv))| MeshVertex {
            position,
            normal: normals.map_or([0.0; 3], |n| n[i]),
            uv,
        })
        .collect()
}

/// Vertex + index buffers for one geometry, uploaded per render call.
pub(crate) struct GpuMesh {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
}

impl GpuMesh {
    /// Returns `None` for geometry with nothing to draw.
    pub(crate) fn upload(device: &wgpu::Device, label: &str, geometry: &Geometry) -> Option<Self> {
        if geometry.vertex_count() == 0 || geometry.index_count() == 0 {
            return None;
        }

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&interleave(geometry)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some(Self { vbo, ibo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_fills_missing_normals_with_zero() {
        let g = Geometry::new(
            vec![[1.0, 2.0, 3.0]; 3],
            vec![[0.25, 0.75]; 3],
            vec![0, 1, 2],
        )
        .unwrap();
        let v = interleave(&g);
        assert_eq!(v.len(), 3);
        assert_eq!(v[1].position, [1.0, 2.0, 3.0]);
        assert_eq!(v[1].normal, [0.0; 3]);
        assert_eq!(v[1].uv, [0.25, 0.75]);
    }

    #[test]
    fn vertex_stride_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }
}

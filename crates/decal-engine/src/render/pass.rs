use std::ops::Range;
use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::coords::DecalRect;
use crate::scene::{Camera, Geometry, Material, Scene};

use super::mesh::GpuMesh;
use super::shader::{PipelineKey, ShaderLibrary};
use super::uniforms::DrawUniform;
use super::{RenderCtx, RenderTarget};

/// One drawable's worth of draws: geometry, transform and the material bound
/// to each index range.
pub(crate) struct DrawItem<'a> {
    pub label: &'a str,
    pub geometry: &'a Geometry,
    pub transform: Mat4,
    pub ranges: Vec<(Range<u32>, Arc<Material>)>,
}

/// Per-pass state shared by every draw.
pub(crate) struct PassParams<'a> {
    pub camera: &'a Camera,
    pub decal_rect: Option<DecalRect>,
    /// `None` keeps the target's current content.
    pub clear: Option<wgpu::Color>,
}

/// Draw items for every visible drawable with its current bindings.
pub(crate) fn scene_items(scene: &Scene) -> Vec<DrawItem<'_>> {
    scene
        .traverse_visible()
        .map(|(_, d)| DrawItem {
            label: &d.name,
            geometry: &d.geometry,
            transform: d.transform,
            ranges: d
                .draw_ranges()
                .into_iter()
                .map(|(range, m)| (range, m.clone()))
                .collect(),
        })
        .collect()
}

struct PreparedDraw {
    mesh: usize,
    range: Range<u32>,
    key: PipelineKey,
    bind_group: wgpu::BindGroup,
    _ubo: wgpu::Buffer,
}

/// Records one render pass drawing `items` into `target`.
///
/// Invisible materials and empty ranges produce no draw. Returns the number of
/// draw calls recorded.
pub(crate) fn encode_pass(
    ctx: &RenderCtx<'_>,
    library: &mut ShaderLibrary,
    target: &mut RenderTarget<'_>,
    params: &PassParams<'_>,
    items: &[DrawItem<'_>],
) -> usize {
    let device = ctx.device();

    // Mutating the library must happen before borrowing pipelines immutably.
    let mut meshes = Vec::with_capacity(items.len());
    let mut draws = Vec::new();
    for item in items {
        let visible: Vec<_> = item
            .ranges
            .iter()
            .filter(|(range, m)| m.is_visible() && !range.is_empty())
            .collect();
        if visible.is_empty() {
            continue;
        }
        let Some(mesh) = GpuMesh::upload(device, item.label, item.geometry) else {
            continue;
        };
        meshes.push(mesh);
        let mesh_index = meshes.len() - 1;

        for (range, material) in visible {
            let key = PipelineKey::new(ctx, material, params.clear.is_none());
            library.ensure_pipeline(ctx, key);

            let uniform = DrawUniform::new(item.transform, params.camera, material, params.decal_rect);
            let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(item.label),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let Some(bind_group) = library.bind_group(ctx, &ubo, material) else {
                continue;
            };

            draws.push(PreparedDraw {
                mesh: mesh_index,
                range: range.clone(),
                key,
                bind_group,
                _ubo: ubo,
            });
        }
    }

    let load = match params.clear {
        Some(color) => wgpu::LoadOp::Clear(color),
        None => wgpu::LoadOp::Load,
    };

    let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("decal-engine pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: target.depth_view.map(|view| {
            wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    let mut recorded = 0;
    for draw in &draws {
        let Some(pipeline) = library.pipeline(&draw.key) else { continue };
        let mesh = &meshes[draw.mesh];

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &draw.bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
        rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(draw.range.clone(), 0, 0..1);
        recorded += 1;
    }

    recorded
}

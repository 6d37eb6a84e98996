use std::collections::HashMap;

use crate::scene::{Material, ShaderVariant};
use crate::texture::{ColorSpace, Texture2d, TextureHandle};

use super::mesh::MeshVertex;
use super::uniforms::DrawUniform;
use super::RenderCtx;

const SCENE_WGSL: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/scene.wgsl")
);
const DECAL_WGSL: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/decal.wgsl")
);

/// Everything that changes a pipeline's fixed-function state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub variant: ShaderVariant,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub double_sided: bool,
    /// Projectors composite over existing content instead of replacing it.
    pub composite: bool,
}

impl PipelineKey {
    /// `loads_target` is true when the pass keeps the target's content.
    pub(crate) fn new(ctx: &RenderCtx<'_>, material: &Material, loads_target: bool) -> Self {
        let variant = material.variant();
        Self {
            variant,
            color_format: ctx.color_format,
            depth_format: ctx.depth_format,
            double_sided: material.is_double_sided(),
            composite: variant.is_projector() && loads_target,
        }
    }
}

/// Straight-alpha "over": color blends by source alpha, coverage accumulates
/// so an opaque base stays opaque.
const DECAL_OVER: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    },
};

impl ShaderVariant {
    fn module_and_entry_points(self) -> (ShaderModuleKind, &'static str, &'static str) {
        match self {
            Self::Surface => (ShaderModuleKind::Scene, "vs_main", "fs_surface"),
            Self::FlatId => (ShaderModuleKind::Scene, "vs_main", "fs_flat_id"),
            Self::UnlitDecalProjector => (ShaderModuleKind::Decal, "vs_unwrap", "fs_unlit"),
            Self::LitDecalProjector => (ShaderModuleKind::Decal, "vs_unwrap", "fs_lit"),
        }
    }

    /// Projectors rasterize in UV space, where winding and depth carry no
    /// meaning.
    #[inline]
    pub fn is_projector(self) -> bool {
        matches!(self, Self::UnlitDecalProjector | Self::LitDecalProjector)
    }

    fn blend(self, composite: bool) -> Option<wgpu::BlendState> {
        match self {
            // Ids must land unmodified.
            Self::FlatId => None,
            Self::Surface => Some(wgpu::BlendState::ALPHA_BLENDING),
            // Onto a cleared target the texel is written as decoded.
            Self::UnlitDecalProjector | Self::LitDecalProjector => composite.then_some(DECAL_OVER),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ShaderModuleKind {
    Scene,
    Decal,
}

/// Pipelines for every shader variant, built lazily once per target format
/// and cached, plus the shared binding resources.
///
/// Each component owns its own library; nothing here is global.
pub struct ShaderLibrary {
    decal_filter: wgpu::FilterMode,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,
    scene_module: Option<wgpu::ShaderModule>,
    decal_module: Option<wgpu::ShaderModule>,

    surface_sampler: Option<wgpu::Sampler>,
    decal_sampler: Option<wgpu::Sampler>,
    white: Option<TextureHandle>,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl ShaderLibrary {
    /// `decal_filter` is the filter used when sampling decal images.
    pub fn new(decal_filter: wgpu::FilterMode) -> Self {
        Self {
            decal_filter,
            bind_group_layout: None,
            pipeline_layout: None,
            scene_module: None,
            decal_module: None,
            surface_sampler: None,
            decal_sampler: None,
            white: None,
            pipelines: HashMap::new(),
        }
    }

    /// Number of pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub(crate) fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        self.ensure_shared(ctx);
        if self.pipelines.contains_key(&key) {
            return;
        }

        let Some(layout) = self.pipeline_layout.as_ref() else { return };
        let (kind, vs_entry, fs_entry) = key.variant.module_and_entry_points();
        let module = match kind {
            ShaderModuleKind::Scene => self.scene_module.as_ref(),
            ShaderModuleKind::Decal => self.decal_module.as_ref(),
        };
        let Some(module) = module else { return };

        let cull_mode = if key.variant.is_projector() || key.double_sided {
            None
        } else {
            Some(wgpu::Face::Back)
        };

        let depth_stencil = key.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: !key.variant.is_projector(),
            depth_compare: if key.variant.is_projector() {
                wgpu::CompareFunction::Always
            } else {
                wgpu::CompareFunction::Less
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let label = format!("decal-engine {:?} pipeline", key.variant);
        let pipeline = ctx
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label.as_str()),
                layout: Some(layout),

                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some(vs_entry),
                    compilation_options: Default::default(),
                    buffers: &[MeshVertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some(fs_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: key.color_format,
                        blend: key.variant.blend(key.composite),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        log::debug!("built {label} for {:?}", key.color_format);
        self.pipelines.insert(key, pipeline);
    }

    pub(crate) fn pipeline(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    /// Bind group for one draw: its uniform buffer, the material's diffuse
    /// (white when it has none) and the variant's sampler.
    pub(crate) fn bind_group(
        &self,
        ctx: &RenderCtx<'_>,
        ubo: &wgpu::Buffer,
        material: &Material,
    ) -> Option<wgpu::BindGroup> {
        let layout = self.bind_group_layout.as_ref()?;
        let texture = material.diffuse().or(self.white.as_ref())?;
        let sampler = if material.variant().is_projector() {
            self.decal_sampler.as_ref()?
        } else {
            self.surface_sampler.as_ref()?
        };

        Some(ctx.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("decal-engine draw bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }))
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_layout.is_some() {
            return;
        }
        let device = ctx.device();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("decal-engine draw bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<DrawUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("decal-engine pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let scene_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("decal-engine scene shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let decal_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("decal-engine decal shader"),
            source: wgpu::ShaderSource::Wgsl(DECAL_WGSL.into()),
        });

        // Material textures tile; decal lookups outside [0, 1] are discarded.
        let surface_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("decal-engine surface sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let decal_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("decal-engine decal sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: self.decal_filter,
            min_filter: self.decal_filter,
            ..Default::default()
        });

        self.white = Some(Texture2d::solid(
            ctx.gpu,
            "decal-engine white",
            [255, 255, 255, 255],
            ColorSpace::Linear,
        ));
        self.surface_sampler = Some(surface_sampler);
        self.decal_sampler = Some(decal_sampler);
        self.scene_module = Some(scene_module);
        self.decal_module = Some(decal_module);
        self.bind_group_layout = Some(bind_group_layout);
        self.pipeline_layout = Some(pipeline_layout);
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new(wgpu::FilterMode::Linear)
    }
}

/// Adapter and device requirements for [`Gpu::headless`](super::Gpu::headless).
///
/// Hosts that already own a device skip this and use
/// [`Gpu::from_parts`](super::Gpu::from_parts).
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Allow a software adapter (lavapipe, WARP) when no hardware one fits.
    pub force_fallback_adapter: bool,

    /// Nothing in the engine needs optional features; keep this empty unless
    /// the host's own rendering does.
    pub required_features: wgpu::Features,

    /// `max_texture_dimension_2d` caps both the picking target and the
    /// bake output.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

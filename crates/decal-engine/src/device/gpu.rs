use anyhow::{Context, Result};

use super::GpuInit;

/// Owns (or shares) the wgpu device and queue used by the picker and baker.
///
/// Both subsystems submit on the same queue as the host's draw loop; nothing in
/// the engine spawns a second submission context.
pub struct Gpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    /// Set only when the engine created the device itself.
    adapter_info: Option<wgpu::AdapterInfo>,
}

impl Gpu {
    /// Requests an adapter with no compatible surface and opens a device on it.
    pub async fn headless(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.device_type,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("decal-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self {
            device,
            queue,
            adapter_info: Some(adapter_info),
        })
    }

    /// Blocking variant of [`Gpu::headless`] for tools and tests.
    pub fn headless_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::headless(init))
    }

    /// Wraps a device/queue the host already owns (for example the one bound to
    /// its window surface).
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            adapter_info: None,
        }
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> Option<&wgpu::AdapterInfo> {
        self.adapter_info.as_ref()
    }

    /// Largest width/height accepted for a 2D render target on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

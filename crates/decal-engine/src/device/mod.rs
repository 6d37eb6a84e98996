//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue for headless use
//! - wrapping a device/queue the host already owns
//!
//! Surfaces and swapchains belong to the host; the engine only renders into
//! its own off-screen targets.

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;

use thiserror::Error;

/// Failures while rendering into an off-screen target or reading it back.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render target {width}x{height} exceeds the device limit of {limit}")]
    TargetTooLarge { width: u32, height: u32, limit: u32 },

    #[error("texture {width}x{height} is empty or exceeds the device limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    #[error("{count} drawables exceed the 24-bit color id space")]
    IdSpaceExhausted { count: usize },

    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("failed to poll device: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("readback callback was dropped before completing")]
    ReadbackDropped,
}

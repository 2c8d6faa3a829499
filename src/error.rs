use thiserror::Error;

/// Failure to allocate a GPU resource at startup or on resize.
///
/// These are fatal: the demo cannot run without its offscreen buffers, so
/// callers propagate them up to `main` rather than retrying.
#[derive(Debug, Error)]
pub enum ResourceCreationError {
    #[error("cannot create a {width}x{height} texture (device limit {limit})")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no compatible gpu adapter found")]
    AdapterNotFound,
    #[error("failed to acquire gpu device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    ResourceCreation(#[from] ResourceCreationError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

use quad_core::GeometryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("source pass drawn before a source texture was bound")]
    MissingSource,
    #[error("cannot read back {0:?} textures")]
    UnreadableFormat(wgpu::TextureFormat),
    #[error("GPU validation failed: {0}")]
    Validation(String),
    #[error("texture readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),
}

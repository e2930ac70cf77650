pub mod conformance;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod readback;
pub mod shader;
pub mod source;

pub use context::GpuContext;
pub use error::GpuError;
pub use pipeline::{vertex_buffer_layout, ScreenPass, Shading};
pub use shader::{ScreenUniforms, SCREEN_WGSL};
pub use source::SourceTexture;

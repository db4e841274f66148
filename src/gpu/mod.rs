mod buffers;
mod context;
mod render;

pub use buffers::MatrixBuffers;
pub use context::GpuContext;
pub use render::MatrixPipeline;

/// GPU resource helpers: attribute-stream buffers, the handle registry the
/// frame loop talks to, and the per-draw uniform ring.
pub mod buffer;
pub mod registry;
pub mod uniform_ring;

pub use registry::HandleRegistry;
pub use uniform_ring::{GpuDrawUniforms, UniformRing, UNIFORM_BLOCK_SIZE};

pub mod cache;
pub mod layout;

pub use cache::{PipelineCache, PipelineKey};
pub use layout::PipelineLayouts;

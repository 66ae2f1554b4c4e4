mod resource_filter;
mod temporary_block;

pub use resource_filter::*;
pub use temporary_block::*;

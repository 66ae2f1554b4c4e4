mod resource;
mod resource_event;

pub use resource::*;
pub use resource_event::*;

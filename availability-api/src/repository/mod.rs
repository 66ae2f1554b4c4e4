mod dto;
mod entity;
mod error;
mod in_memory_resources_repository;
mod mongo_resources_repository;
mod resources_repository;

pub use dto::*;
pub use error::*;
pub use in_memory_resources_repository::*;
pub use mongo_resources_repository::*;
pub use resources_repository::*;

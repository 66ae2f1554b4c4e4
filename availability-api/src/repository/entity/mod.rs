mod resource_entity;

pub use resource_entity::*;

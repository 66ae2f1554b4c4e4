mod rabbitmq_events_service_config;
mod resource_event;

pub use rabbitmq_events_service_config::*;
pub use resource_event::*;

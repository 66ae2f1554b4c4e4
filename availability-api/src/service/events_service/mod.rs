mod dto;
mod events_service;
mod rabbitmq_events_service;
mod rabbitmq_publisher;
mod rabbitmq_publisher_channel_callback;
mod retry;
mod tracing_events_service;
mod unconfirmed_messages;

pub use dto::{RabbitmqEventsServiceConfig, ResourceEvent};
pub use events_service::*;
pub use rabbitmq_events_service::*;
pub use tracing_events_service::*;

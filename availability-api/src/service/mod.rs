pub mod availability_service;
pub mod events_service;

pub mod application;
pub mod clock;
pub mod dto;
pub mod error;
pub mod repository;
pub mod routing;
pub mod service;

mod availability_service;
mod availability_service_impl;

pub use availability_service::*;
pub use availability_service_impl::*;

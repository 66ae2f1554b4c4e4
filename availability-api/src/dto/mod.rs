//!
//! Module with all dtos that are passed between server and its clients
//!

pub mod input;
pub mod output;

//! Core business logic for pulso-rs.

pub mod services;

pub use services::*;

//! Core business logic for gavel.

pub mod services;

pub use services::*;

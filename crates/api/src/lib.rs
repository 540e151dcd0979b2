//! HTTP API layer for gavel.
//!
//! This crate provides the REST surface of the enforcement engine:
//!
//! - **Endpoints**: violation ingestion, admin actions and overrides,
//!   sweep trigger, account status
//! - **Extractors**: bearer-token principals (admin, scheduler, ingest)
//! - **Middleware**: authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;

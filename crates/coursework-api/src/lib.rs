//! Coursework REST API
//!
//! This crate provides the Axum-based HTTP API: health check, user
//! accounts, assignment CRUD and submissions.

pub mod error;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

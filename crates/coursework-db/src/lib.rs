//! Coursework Database Layer
//!
//! This crate provides the persistence layer for the coursework API,
//! storing users, assignments and submissions in SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::{Error as SqlxError, SqlitePool};

//! Coursework Authentication and Authorization
//!
//! This crate turns an `Authorization` header into a stored user and
//! decides whether that user may mutate a resource:
//!
//! - [`credentials`] decodes `Basic` credentials
//! - [`password`] hashes and verifies passwords with Argon2id
//! - [`access`] authenticates users and evaluates resource ownership

pub mod access;
pub mod credentials;
pub mod error;
pub mod password;

pub use access::{Access, Owned, authenticate, authenticate_header, authorize_ownership};
pub use credentials::{Credentials, decode_basic, is_valid_email};
pub use error::AuthError;
pub use password::{hash_password, verify_password};

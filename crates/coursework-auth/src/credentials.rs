//! Basic credential decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::AuthError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

/// Identity and secret carried by an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Decode `Basic base64(identity:secret)`
///
/// A missing header yields [`AuthError::MissingCredentials`]. Anything else
/// that is not exactly two non-empty `:`-separated parts after decoding
/// yields [`AuthError::MalformedCredentials`].
pub fn decode_basic(header: Option<&str>) -> Result<Credentials, AuthError> {
    let header = header.map(str::trim).ok_or(AuthError::MissingCredentials)?;
    if header.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedCredentials)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::MalformedCredentials);
    }

    let decoded = STANDARD
        .decode(token.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let parts: Vec<&str> = decoded.split(':').collect();
    match parts.as_slice() {
        [identity, secret] if !identity.is_empty() && !secret.is_empty() => Ok(Credentials {
            identity: identity.to_string(),
            secret: secret.to_string(),
        }),
        _ => Err(AuthError::MalformedCredentials),
    }
}

/// Syntactic email check applied to identities and new accounts
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

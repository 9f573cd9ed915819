//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,

    #[error("Malformed credentials")]
    MalformedCredentials,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid credentials")]
    AuthenticationFailed,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] coursework_db::DbError),
}

impl AuthError {
    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AuthError::InvalidEmail => StatusCode::BAD_REQUEST,
            AuthError::PasswordHash(_) | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::PasswordHash(_) | AuthError::Database(_) => "Internal error".to_string(),
            other => other.to_string(),
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

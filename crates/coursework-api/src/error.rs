//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Core error: {0}")]
    Core(#[from] coursework_core::CoreError),

    #[error("Database error: {0}")]
    Database(#[from] coursework_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] coursework_auth::AuthError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        use coursework_core::CoreError;
        use coursework_db::DbError;

        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Core(e) => match e {
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                CoreError::DeadlinePassed | CoreError::AttemptsExceeded => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                CoreError::UpstreamUnreachable(_) => {
                    (StatusCode::NOT_FOUND, "Submission file not found".to_string())
                }
                CoreError::Database(db) => database_status(db),
                CoreError::Task(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
            },
            ApiError::Database(e) => database_status(e),
            ApiError::Auth(e) => match e {
                coursework_auth::AuthError::PasswordHash(_)
                | coursework_auth::AuthError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
                _ => (e.status(), e.to_string()),
            },
        }
    }
}

fn database_status(e: &coursework_db::DbError) -> (StatusCode, String) {
    match e {
        coursework_db::DbError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        coursework_db::DbError::Query(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error".to_string(),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

//! User account routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use coursework_auth::{hash_password, is_valid_email};
use coursework_db::{DbError, NewUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::extract::{JsonPayload, RequireAuth};
use super::types::{CreateUserRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed password length
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// A create request with every field present and checked
struct ValidatedUser {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

fn validate_new_user(request: CreateUserRequest) -> Result<ValidatedUser, ApiError> {
    let present = |field: Option<String>| field.filter(|f| !f.trim().is_empty());
    let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
        present(request.first_name),
        present(request.last_name),
        present(request.email),
        present(request.password),
    ) else {
        return Err(ApiError::BadRequest(
            "Values cannot be Null : first_name, last_name, email, password".to_string(),
        ));
    };

    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    Ok(ValidatedUser {
        first_name,
        last_name,
        email,
        password,
    })
}

// ==================== User Routes ====================

/// POST /v1/users
async fn create_user(
    State(state): State<AppState>,
    JsonPayload(request): JsonPayload<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let request = validate_new_user(request)?;

    debug!("Creating user: {}", request.email);

    let password_hash = hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::BadRequest("User already exist".to_string()),
            other => other.into(),
        })?;

    info!("Created user: {}", user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /v1/users/self
async fn get_self(RequireAuth(user): RequireAuth) -> Json<UserResponse> {
    Json(user.into())
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/self", get(get_self))
}

//! Assignment CRUD routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use coursework_auth::{Access, authorize_ownership};
use coursework_core::parse_assignment;
use coursework_db::{Assignment, DbError, NewAssignment, User};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::extract::{JsonPayload, RequireAuth};
use super::types::AssignmentResponse;

const DUPLICATE_ASSIGNMENT: &str = "Assignment already exist";

fn duplicate_as_bad_request(err: DbError) -> ApiError {
    match err {
        DbError::Duplicate(_) => ApiError::BadRequest(DUPLICATE_ASSIGNMENT.to_string()),
        other => other.into(),
    }
}

/// Load an assignment that `user` is allowed to modify
async fn owned_assignment(state: &AppState, user: &User, id: i64) -> Result<Assignment, ApiError> {
    let assignment = state.db.get_assignment_by_id(id).await?;

    match authorize_ownership(user, assignment.as_ref()) {
        Access::Allowed => assignment.ok_or_else(|| not_found(id)),
        Access::Forbidden => {
            debug!("User {} denied access to assignment {}", user.id, id);
            Err(ApiError::Forbidden)
        }
        Access::NotFound => Err(not_found(id)),
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Assignment: {}", id))
}

/// GET /v1/assignments
async fn list_assignments(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = state.db.list_assignments().await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

/// POST /v1/assignments
async fn create_assignment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonPayload(payload): JsonPayload<Value>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let input = parse_assignment(&payload)?;

    let assignment = state
        .db
        .insert_assignment(NewAssignment {
            name: input.name,
            points: input.points,
            num_of_attempts: input.num_of_attempts,
            deadline: input.deadline,
            owner_user_id: user.id,
        })
        .await
        .map_err(duplicate_as_bad_request)?;

    info!(
        "User {} created assignment {} ({})",
        user.email, assignment.id, assignment.name
    );

    Ok((StatusCode::CREATED, Json(assignment.into())))
}

/// GET /v1/assignments/{id}
async fn get_assignment(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = state
        .db
        .get_assignment_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(assignment.into()))
}

/// PUT /v1/assignments/{id}
async fn update_assignment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    JsonPayload(payload): JsonPayload<Value>,
) -> Result<StatusCode, ApiError> {
    let current = owned_assignment(&state, &user, id).await?;
    let input = parse_assignment(&payload)?;

    state
        .db
        .update_assignment(Assignment {
            name: input.name,
            points: input.points,
            num_of_attempts: input.num_of_attempts,
            deadline: input.deadline,
            ..current
        })
        .await
        .map_err(duplicate_as_bad_request)?
        .ok_or_else(|| not_found(id))?;

    info!("User {} updated assignment {}", user.email, id);

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/assignments/{id}
async fn delete_assignment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    owned_assignment(&state, &user, id).await?;

    if !state.db.delete_assignment(id).await? {
        return Err(not_found(id));
    }

    info!("User {} deleted assignment {}", user.email, id);

    Ok(StatusCode::NO_CONTENT)
}

/// Create assignment routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route(
            "/v1/assignments/{id}",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
}

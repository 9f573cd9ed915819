//! Submission routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use coursework_auth::{Access, authorize_ownership};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

use super::extract::{JsonPayload, RequireAuth};
use super::types::SubmissionResponse;

/// POST /v1/assignments/{id}/submission
async fn create_submission(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(assignment_id): Path<i64>,
    JsonPayload(payload): JsonPayload<Value>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let submission = state
        .submissions
        .submit(&user, assignment_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// GET /v1/assignments/{id}/submissions
///
/// Only the assignment owner may list its submissions.
async fn list_submissions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(assignment_id): Path<i64>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let assignment = state.db.get_assignment_by_id(assignment_id).await?;

    match authorize_ownership(&user, assignment.as_ref()) {
        Access::Allowed => {}
        Access::Forbidden => return Err(ApiError::Forbidden),
        Access::NotFound => {
            return Err(ApiError::NotFound(format!("Assignment: {}", assignment_id)));
        }
    }

    let submissions = state.db.list_submissions(assignment_id).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// Create submission routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/assignments/{id}/submission", post(create_submission))
        .route("/v1/assignments/{id}/submissions", get(list_submissions))
}

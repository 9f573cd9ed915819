//! Request/Response DTOs

use coursework_db::{Assignment, Submission, User};
use serde::{Deserialize, Serialize};

// ==================== User Types ====================

/// Create user request
///
/// Fields are optional so that a missing field gets the same message as an
/// empty one.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User response (without password)
#[derive(Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub account_created: String,
    pub account_updated: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            account_created: user.account_created.to_rfc3339(),
            account_updated: user.account_updated.to_rfc3339(),
        }
    }
}

// ==================== Assignment Types ====================

/// Assignment response
#[derive(Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub id: i64,
    pub name: String,
    pub points: i64,
    pub num_of_attempts: i64,
    pub deadline: String,
    pub assignment_created: String,
    pub assignment_updated: String,
}

impl From<Assignment> for AssignmentResponse {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            name: assignment.name,
            points: assignment.points,
            num_of_attempts: assignment.num_of_attempts,
            deadline: assignment.deadline.to_rfc3339(),
            assignment_created: assignment.assignment_created.to_rfc3339(),
            assignment_updated: assignment.assignment_updated.to_rfc3339(),
        }
    }
}

// ==================== Submission Types ====================

/// Submission response
#[derive(Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: i64,
    pub assignment_id: i64,
    pub submission_url: String,
    pub submission_date: String,
    pub submission_updated: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            assignment_id: submission.assignment_id,
            submission_url: submission.submission_url,
            submission_date: submission.submission_date.to_rfc3339(),
            submission_updated: submission.submission_updated.to_rfc3339(),
        }
    }
}

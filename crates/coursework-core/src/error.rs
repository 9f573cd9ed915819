//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] coursework_db::DbError),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Deadline has passed")]
    DeadlinePassed,

    #[error("Maximum number of attempts exceeded")]
    AttemptsExceeded,

    #[error("Submission file not reachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Submission task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

//! Coursework Core Business Logic
//!
//! This crate provides payload validation for assignments and submissions
//! and the submission workflow (deadline, attempt limit, URL probe,
//! notification).

pub mod error;
pub mod submission;
pub mod validation;

pub use error::CoreError;
pub use submission::SubmissionService;
pub use validation::{
    AssignmentInput, Verdict, check_assignment, check_submission, parse_assignment,
    parse_submission,
};

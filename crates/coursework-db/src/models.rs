//! Database models
//!
//! Models are plain value records. Changing a stored row means building a new
//! value and passing it to the matching repository `update_*` call.

use crate::utils::{parse_datetime, parse_datetime_or_now};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub account_created: DateTime<Utc>,
    pub account_updated: DateTime<Utc>,
}

impl User {
    /// Display name used in notifications
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Assignment owned by the user who created it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    pub points: i64,
    pub num_of_attempts: i64,
    pub deadline: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub owner_user_id: i64,
    pub assignment_created: DateTime<Utc>,
    pub assignment_updated: DateTime<Utc>,
}

impl Assignment {
    /// Whether submissions are closed at `now`
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// New assignment (for insertion)
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub name: String,
    pub points: i64,
    pub num_of_attempts: i64,
    pub deadline: DateTime<Utc>,
    pub owner_user_id: i64,
}

/// Submission of an archive URL against an assignment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub submission_url: String,
    pub submission_date: DateTime<Utc>,
    pub submission_updated: DateTime<Utc>,
}

/// New submission (for insertion)
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub assignment_id: i64,
    pub user_id: i64,
    pub submission_url: String,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            account_created: parse_datetime_or_now(&row.try_get::<String, _>("account_created")?),
            account_updated: parse_datetime_or_now(&row.try_get::<String, _>("account_updated")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Assignment {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Assignment {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            points: row.try_get("points")?,
            num_of_attempts: row.try_get("num_of_attempts")?,
            deadline: parse_datetime(&row.try_get::<String, _>("deadline")?, "deadline")?,
            owner_user_id: row.try_get("owner_user_id")?,
            assignment_created: parse_datetime_or_now(
                &row.try_get::<String, _>("assignment_created")?,
            ),
            assignment_updated: parse_datetime_or_now(
                &row.try_get::<String, _>("assignment_updated")?,
            ),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Submission {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Submission {
            id: row.try_get("id")?,
            assignment_id: row.try_get("assignment_id")?,
            user_id: row.try_get("user_id")?,
            submission_url: row.try_get("submission_url")?,
            submission_date: parse_datetime_or_now(&row.try_get::<String, _>("submission_date")?),
            submission_updated: parse_datetime_or_now(
                &row.try_get::<String, _>("submission_updated")?,
            ),
        })
    }
}

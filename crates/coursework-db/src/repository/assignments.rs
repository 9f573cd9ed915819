//! Assignment operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{Assignment, NewAssignment};
use crate::repository::Database;
use crate::repository::users::unique_violation;

const ASSIGNMENT_COLUMNS: &str = "id, name, points, num_of_attempts, deadline, owner_user_id, assignment_created, assignment_updated";

impl Database {
    /// Insert a new assignment
    ///
    /// Assignment names are unique across all owners.
    pub async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment, DbError> {
        let now = Utc::now();

        if self.get_assignment_by_name(&assignment.name).await?.is_some() {
            return Err(DbError::Duplicate(format!(
                "Assignment '{}' already exists",
                assignment.name
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO assignments (name, points, num_of_attempts, deadline, owner_user_id, assignment_created, assignment_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&assignment.name)
        .bind(assignment.points)
        .bind(assignment.num_of_attempts)
        .bind(assignment.deadline.to_rfc3339())
        .bind(assignment.owner_user_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &assignment.name))?;

        let id: i64 = result.get("id");

        Ok(Assignment {
            id,
            name: assignment.name,
            points: assignment.points,
            num_of_attempts: assignment.num_of_attempts,
            deadline: assignment.deadline,
            owner_user_id: assignment.owner_user_id,
            assignment_created: now,
            assignment_updated: now,
        })
    }

    /// Get an assignment by ID
    pub async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>, DbError> {
        let sql = format!("SELECT {} FROM assignments WHERE id = ?", ASSIGNMENT_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Assignment::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get an assignment by its unique name
    pub async fn get_assignment_by_name(&self, name: &str) -> Result<Option<Assignment>, DbError> {
        let sql = format!("SELECT {} FROM assignments WHERE name = ?", ASSIGNMENT_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Assignment::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all assignments, oldest first
    pub async fn list_assignments(&self) -> Result<Vec<Assignment>, DbError> {
        let sql = format!("SELECT {} FROM assignments ORDER BY id", ASSIGNMENT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Assignment::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Persist a new version of an assignment
    ///
    /// Writes every mutable field of `assignment` and stamps
    /// `assignment_updated`. Returns the stored version, or `None` when the
    /// row no longer exists.
    pub async fn update_assignment(
        &self,
        assignment: Assignment,
    ) -> Result<Option<Assignment>, DbError> {
        if let Some(existing) = self.get_assignment_by_name(&assignment.name).await? {
            if existing.id != assignment.id {
                return Err(DbError::Duplicate(format!(
                    "Assignment '{}' already exists",
                    assignment.name
                )));
            }
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET name = ?, points = ?, num_of_attempts = ?, deadline = ?, assignment_updated = ?
            WHERE id = ?
            "#,
        )
        .bind(&assignment.name)
        .bind(assignment.points)
        .bind(assignment.num_of_attempts)
        .bind(assignment.deadline.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(assignment.id)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &assignment.name))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Assignment {
            assignment_updated: now,
            ..assignment
        }))
    }

    /// Delete an assignment together with its submissions
    pub async fn delete_assignment(&self, id: i64) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM submissions WHERE assignment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM assignments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Deleted assignment {} and {} submissions", id, removed);
        Ok(result.rows_affected() > 0)
    }
}

//! Submission operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewSubmission, Submission};
use crate::repository::Database;

impl Database {
    /// Insert a submission if the assignment still has attempts left
    ///
    /// The count and the insert run in one `BEGIN IMMEDIATE` transaction, so
    /// concurrent callers are serialised on the write lock and can never push
    /// the count past `limit`. Returns `None` when the limit is reached.
    pub async fn reserve_submission(
        &self,
        submission: NewSubmission,
        limit: i64,
    ) -> Result<Option<Submission>, DbError> {
        let now = Utc::now();
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let used: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE assignment_id = ?")
                .bind(submission.assignment_id)
                .fetch_one(&mut *tx)
                .await?;

        if used >= limit {
            tx.rollback().await?;
            debug!(
                "Assignment {} has used {} of {} attempts",
                submission.assignment_id, used, limit
            );
            return Ok(None);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO submissions (assignment_id, user_id, submission_url, submission_date, submission_updated)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(submission.assignment_id)
        .bind(submission.user_id)
        .bind(&submission.submission_url)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let id: i64 = result.get("id");
        debug!("Reserved submission {} ({} of {})", id, used + 1, limit);

        Ok(Some(Submission {
            id,
            assignment_id: submission.assignment_id,
            user_id: submission.user_id,
            submission_url: submission.submission_url,
            submission_date: now,
            submission_updated: now,
        }))
    }

    /// Delete a submission by ID
    pub async fn delete_submission(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count submissions for an assignment
    pub async fn count_submissions(&self, assignment_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM submissions WHERE assignment_id = ?")
            .bind(assignment_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// List submissions for an assignment, oldest first
    pub async fn list_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, assignment_id, user_id, submission_url, submission_date, submission_updated
            FROM submissions
            WHERE assignment_id = ?
            ORDER BY id
            "#,
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Submission::try_from(row).map_err(DbError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::repository::test_support;
    use crate::{Database, NewAssignment, NewSubmission};

    async fn setup(attempts: i64) -> (Database, tempfile::TempDir, i64, i64) {
        let (db, dir) = test_support::open().await;
        let user = test_support::user(&db, "student@example.com").await;
        let assignment = db
            .insert_assignment(NewAssignment {
                name: "HW1".to_string(),
                points: 10,
                num_of_attempts: attempts,
                deadline: Utc::now() + Duration::days(1),
                owner_user_id: user.id,
            })
            .await
            .unwrap();
        (db, dir, assignment.id, user.id)
    }

    fn new_submission(assignment_id: i64, user_id: i64) -> NewSubmission {
        NewSubmission {
            assignment_id,
            user_id,
            submission_url: "https://example.com/work.zip".to_string(),
        }
    }

    #[tokio::test]
    async fn test_reserve_until_limit() {
        let (db, _dir, assignment_id, user_id) = setup(2).await;

        for _ in 0..2 {
            let reserved = db
                .reserve_submission(new_submission(assignment_id, user_id), 2)
                .await
                .unwrap();
            assert!(reserved.is_some());
        }

        let refused = db
            .reserve_submission(new_submission(assignment_id, user_id), 2)
            .await
            .unwrap();
        assert!(refused.is_none());

        let listed = db.list_submissions(assignment_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].submission_url, "https://example.com/work.zip");
        assert_eq!(listed[0].user_id, user_id);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_respect_limit() {
        let (db, _dir, assignment_id, user_id) = setup(3).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.reserve_submission(new_submission(assignment_id, user_id), 3)
                    .await
                    .unwrap()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 3);
        assert_eq!(db.count_submissions(assignment_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_frees_attempt() {
        let (db, _dir, assignment_id, user_id) = setup(1).await;

        let reserved = db
            .reserve_submission(new_submission(assignment_id, user_id), 1)
            .await
            .unwrap()
            .unwrap();
        assert!(db.delete_submission(reserved.id).await.unwrap());
        assert!(!db.delete_submission(reserved.id).await.unwrap());
        assert_eq!(db.count_submissions(assignment_id).await.unwrap(), 0);

        let again = db
            .reserve_submission(new_submission(assignment_id, user_id), 1)
            .await
            .unwrap();
        assert!(again.is_some());
        assert_eq!(db.count_submissions(assignment_id + 1).await.unwrap(), 0);
    }
}

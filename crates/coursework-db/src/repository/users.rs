//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

impl Database {
    /// Insert a new user
    ///
    /// Emails are unique; a second account with the same email is rejected
    /// with [`DbError::Duplicate`].
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        if self.get_user_by_email(&user.email).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, account_created, account_updated)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, &user.email))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            account_created: now,
            account_updated: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, password_hash, account_created, account_updated
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, password_hash, account_created, account_updated
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }
}

/// Map a unique-constraint failure that slipped past the pre-check
pub(crate) fn unique_violation(err: sqlx::Error, key: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Duplicate(format!("'{}' already exists", key))
        }
        _ => DbError::Query(err),
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support;
    use crate::{DbError, NewUser};

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let (db, _dir) = test_support::open().await;

        let user = test_support::user(&db, "jane@example.com").await;
        assert!(user.id > 0);

        let by_email = db.get_user_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "jane@example.com");

        assert!(db.get_user_by_email("nobody@example.com").await.unwrap().is_none());
        assert!(db.get_user_by_id(user.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (db, _dir) = test_support::open().await;
        test_support::user(&db, "jane@example.com").await;

        let result = db
            .insert_user(NewUser {
                first_name: "Other".to_string(),
                last_name: "Person".to_string(),
                email: "jane@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DbError::Duplicate(_))));
    }
}

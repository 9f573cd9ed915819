//! Startup import of user accounts from CSV

use anyhow::{Context, Result, bail};
use coursework_auth::hash_password;
use coursework_db::{Database, DbError, NewUser};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// One row of the users file
#[derive(Debug, Deserialize)]
struct UserRecord {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

impl UserRecord {
    fn has_empty_field(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.password]
            .iter()
            .any(|f| f.trim().is_empty())
    }
}

/// Outcome of an import run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Import users from `path`
///
/// Every row is checked before anything is written; a row with an empty field
/// aborts the whole import. Emails that already exist are skipped.
pub async fn import_users(db: &Database, path: &Path) -> Result<ImportSummary> {
    if !path.exists() {
        warn!("User import file {} not found, skipping", path.display());
        return Ok(ImportSummary::default());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<UserRecord>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record = row.with_context(|| format!("Invalid user record on line {}", line))?;
        if record.has_empty_field() {
            bail!("Enter valid user data: empty field on line {}", line);
        }
        records.push(record);
    }

    let mut summary = ImportSummary::default();
    for record in records {
        if db.get_user_by_email(&record.email).await?.is_some() {
            debug!("User {} already exists, skipping", record.email);
            summary.skipped += 1;
            continue;
        }

        let password_hash = hash_password(&record.password)?;
        match db
            .insert_user(NewUser {
                first_name: record.first_name,
                last_name: record.last_name,
                email: record.email,
                password_hash,
            })
            .await
        {
            Ok(_) => summary.created += 1,
            Err(DbError::Duplicate(email)) => {
                debug!("User {} already exists, skipping", email);
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        "Imported users from {}: {} created, {} skipped",
        path.display(),
        summary.created,
        summary.skipped
    );

    Ok(summary)
}

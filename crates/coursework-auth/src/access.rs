//! User authentication and ownership checks

use coursework_db::{Assignment, Database, User};
use tracing::debug;

use crate::credentials::{decode_basic, is_valid_email};
use crate::error::AuthError;
use crate::password::verify_password;

/// Valid Argon2 digest of a random string, verified against when the identity
/// is unknown so both paths cost one hash computation.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
    NotFound,
}

/// A resource with a recorded owner
pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for Assignment {
    fn owner_id(&self) -> i64 {
        self.owner_user_id
    }
}

/// Look up a user by email and verify the secret
///
/// Unknown users and wrong secrets are both `Ok(None)`. Errors are reserved
/// for storage failures and corrupted stored digests.
pub async fn authenticate(
    db: &Database,
    identity: &str,
    secret: &str,
) -> Result<Option<User>, AuthError> {
    let Some(user) = db.get_user_by_email(identity).await? else {
        let _ = verify_password(secret, DUMMY_HASH);
        debug!("Authentication failed: unknown identity {}", identity);
        return Ok(None);
    };

    if verify_password(secret, &user.password_hash)? {
        Ok(Some(user))
    } else {
        debug!("Authentication failed: wrong secret for {}", identity);
        Ok(None)
    }
}

/// Run the full header-to-user pipeline
///
/// absent header -> `MissingCredentials`, undecodable -> `MalformedCredentials`,
/// non-email identity -> `InvalidEmail`, unknown user or wrong secret ->
/// `AuthenticationFailed`.
pub async fn authenticate_header(db: &Database, header: Option<&str>) -> Result<User, AuthError> {
    let result = authenticate_header_inner(db, header).await;
    if let Err(e) = &result {
        metrics::counter!("coursework_auth_failures_total", "reason" => failure_reason(e))
            .increment(1);
    }
    result
}

async fn authenticate_header_inner(db: &Database, header: Option<&str>) -> Result<User, AuthError> {
    let credentials = decode_basic(header)?;

    if !is_valid_email(&credentials.identity) {
        return Err(AuthError::InvalidEmail);
    }

    authenticate(db, &credentials.identity, &credentials.secret)
        .await?
        .ok_or(AuthError::AuthenticationFailed)
}

fn failure_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingCredentials => "missing",
        AuthError::MalformedCredentials => "malformed",
        AuthError::InvalidEmail => "invalid_email",
        AuthError::AuthenticationFailed => "rejected",
        AuthError::PasswordHash(_) | AuthError::Database(_) => "internal",
    }
}

/// Decide whether `user` may mutate `resource`
///
/// Existence is checked before ownership, so a missing resource is always
/// `NotFound` regardless of who asks.
pub fn authorize_ownership<R: Owned>(user: &User, resource: Option<&R>) -> Access {
    match resource {
        None => Access::NotFound,
        Some(r) if r.owner_id() != user.id => Access::Forbidden,
        Some(_) => Access::Allowed,
    }
}

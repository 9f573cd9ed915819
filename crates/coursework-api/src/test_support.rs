//! Shared fixtures for route tests

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, header},
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use coursework_auth::hash_password;
use coursework_core::SubmissionService;
use coursework_db::{Database, NewUser, User};
use coursework_notify::{Notifier, NotifyError, SubmissionNotice, UrlProbe};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

pub const PASSWORD: &str = "correct-horse-battery";

/// Probe whose answer can be flipped during a test
#[derive(Default)]
pub struct SwitchProbe {
    pub unreachable: AtomicBool,
}

#[async_trait]
impl UrlProbe for SwitchProbe {
    async fn probe(&self, url: &str) -> Result<(), NotifyError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(NotifyError::UnexpectedStatus {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<SubmissionNotice>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: SubmissionNotice) -> Result<(), NotifyError> {
        self.notices.lock().unwrap().push(notice);
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub owner: User,
    pub probe: Arc<SwitchProbe>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("api.db").display());
        let db = Database::new(&url).await.unwrap();

        let probe = Arc::new(SwitchProbe::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let submissions = SubmissionService::new(db.clone(), probe.clone(), notifier.clone());
        let state = AppState::new(db, submissions);
        let router = create_router(state.clone(), None);

        let owner = seed_user(&state.db, "owner@example.com").await;

        Self {
            state,
            router,
            owner,
            probe,
            notifier,
            _dir: dir,
        }
    }

    /// Create another account with the shared test password
    pub async fn user(&self, email: &str) -> User {
        seed_user(&self.state.db, email).await
    }

    /// Basic header for the seeded owner
    pub fn owner_auth(&self) -> String {
        basic(&self.owner.email, PASSWORD)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Wait for the spawned notifier task to record `count` notices
    pub async fn notices(&self, count: usize) -> Vec<SubmissionNotice> {
        for _ in 0..100 {
            {
                let notices = self.notifier.notices.lock().unwrap();
                if notices.len() >= count {
                    return notices.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("expected {count} notices");
    }
}

pub fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

async fn seed_user(db: &Database, email: &str) -> User {
    db.insert_user(NewUser {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
    })
    .await
    .unwrap()
}

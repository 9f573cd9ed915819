//! Submission workflow
//!
//! A submission is accepted only when the payload validates, the assignment
//! exists, its deadline has not passed, its attempt limit has room, and the
//! submitted archive answers a `HEAD` request. The attempt is reserved
//! atomically before the URL check, and deleted again if the check fails.

use chrono::Utc;
use coursework_db::{Database, NewSubmission, Submission, User};
use coursework_notify::{Notifier, SubmissionNotice, UrlProbe};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::validation::parse_submission;

/// Accepts submissions and reports each attempt to the notifier
#[derive(Clone)]
pub struct SubmissionService {
    db: Database,
    probe: Arc<dyn UrlProbe>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionService {
    pub fn new(db: Database, probe: Arc<dyn UrlProbe>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            probe,
            notifier,
        }
    }

    /// Submit `payload` against an assignment on behalf of `user`
    pub async fn submit(
        &self,
        user: &User,
        assignment_id: i64,
        payload: &Value,
    ) -> Result<Submission, CoreError> {
        let url = match parse_submission(payload) {
            Ok(url) => url,
            Err(e) => {
                let raw = match payload.get("submission_url") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                self.dispatch(SubmissionNotice::invalid_url(raw, &user.email));
                return Err(e);
            }
        };

        let assignment = self
            .db
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Assignment: {}", assignment_id)))?;

        if assignment.deadline_passed(Utc::now()) {
            debug!("Rejected submission for {}: deadline passed", assignment.id);
            return Err(CoreError::DeadlinePassed);
        }

        let submission = self
            .db
            .reserve_submission(
                NewSubmission {
                    assignment_id: assignment.id,
                    user_id: user.id,
                    submission_url: url,
                },
                assignment.num_of_attempts,
            )
            .await?
            .ok_or_else(|| {
                debug!(
                    "Rejected submission for {}: all {} attempts used",
                    assignment.id, assignment.num_of_attempts
                );
                CoreError::AttemptsExceeded
            })?;

        // Detached so a dropped request still confirms or removes the row
        let service = self.clone();
        let user = user.clone();
        tokio::spawn(async move { service.confirm(submission, &user).await }).await?
    }

    /// Keep a reserved submission if its archive is reachable, otherwise delete it
    async fn confirm(&self, submission: Submission, user: &User) -> Result<Submission, CoreError> {
        let url = submission.submission_url.clone();

        if let Err(e) = self.probe.probe(&url).await {
            warn!("Submission URL {} not reachable: {}", url, e);
            self.db.delete_submission(submission.id).await?;
            self.dispatch(SubmissionNotice::no_file(&url, &user.email));
            return Err(CoreError::UpstreamUnreachable(url));
        }

        info!(
            "Accepted submission {} for assignment {} from {}",
            submission.id, submission.assignment_id, user.email
        );

        self.dispatch(SubmissionNotice::valid(
            &url,
            &user.email,
            user.full_name(),
            user.id,
            submission.assignment_id,
        ));

        Ok(submission)
    }

    /// Hand a notice to the notifier without waiting for delivery
    fn dispatch(&self, notice: SubmissionNotice) {
        metrics::counter!("coursework_submissions_total", "status" => notice.status.as_str())
            .increment(1);

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let status = notice.status;
            if let Err(e) = notifier.notify(notice).await {
                warn!("Failed to deliver {} notice: {}", status.as_str(), e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use coursework_db::{Assignment, NewAssignment, NewUser};
    use coursework_notify::{NoticeStatus, NotifyError};
    use serde_json::json;
    use tokio::sync::{Notify, mpsc};

    struct FixedProbe(bool);

    #[async_trait]
    impl UrlProbe for FixedProbe {
        async fn probe(&self, url: &str) -> Result<(), NotifyError> {
            if self.0 {
                Ok(())
            } else {
                Err(NotifyError::UnexpectedStatus {
                    status: 404,
                    url: url.to_string(),
                })
            }
        }
    }

    /// Reports each call on `entered`, then waits for `release` before answering
    struct GatedCheck {
        reachable: bool,
        entered: mpsc::UnboundedSender<()>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl UrlProbe for GatedCheck {
        async fn probe(&self, url: &str) -> Result<(), NotifyError> {
            let _ = self.entered.send(());
            self.release.notified().await;
            FixedProbe(self.reachable).probe(url).await
        }
    }

    struct ChannelNotifier(mpsc::UnboundedSender<SubmissionNotice>);

    #[async_trait]
    impl Notifier for ChannelNotifier {
        async fn notify(&self, notice: SubmissionNotice) -> Result<(), NotifyError> {
            let _ = self.0.send(notice);
            Ok(())
        }
    }

    struct Fixture {
        db: Database,
        user: User,
        notices: mpsc::UnboundedReceiver<SubmissionNotice>,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let url = format!("sqlite:{}?mode=rwc", dir.path().join("core.db").display());
            let db = Database::new(&url).await.unwrap();
            let user = db
                .insert_user(NewUser {
                    first_name: "Jane".to_string(),
                    last_name: "Doe".to_string(),
                    email: "jane@example.com".to_string(),
                    password_hash: "unused".to_string(),
                })
                .await
                .unwrap();
            let (_, notices) = mpsc::unbounded_channel();
            Self {
                db,
                user,
                notices,
                _dir: dir,
            }
        }

        fn service(&mut self, reachable: bool) -> SubmissionService {
            self.service_with(Arc::new(FixedProbe(reachable)))
        }

        fn service_with(&mut self, check: Arc<dyn UrlProbe>) -> SubmissionService {
            let (tx, rx) = mpsc::unbounded_channel();
            self.notices = rx;
            SubmissionService::new(self.db.clone(), check, Arc::new(ChannelNotifier(tx)))
        }

        /// Service whose URL check blocks until the returned `Notify` fires
        fn gated_service(
            &mut self,
            reachable: bool,
        ) -> (SubmissionService, mpsc::UnboundedReceiver<()>, Arc<Notify>) {
            let (entered, entered_rx) = mpsc::unbounded_channel();
            let release = Arc::new(Notify::new());
            let service = self.service_with(Arc::new(GatedCheck {
                reachable,
                entered,
                release: release.clone(),
            }));
            (service, entered_rx, release)
        }

        async fn assignment(&self, attempts: i64, deadline_in: Duration) -> Assignment {
            self.db
                .insert_assignment(NewAssignment {
                    name: format!("HW-{}", deadline_in.num_seconds()),
                    points: 50,
                    num_of_attempts: attempts,
                    deadline: Utc::now() + deadline_in,
                    owner_user_id: self.user.id,
                })
                .await
                .unwrap()
        }

        async fn next_notice(&mut self) -> SubmissionNotice {
            tokio::time::timeout(std::time::Duration::from_secs(5), self.notices.recv())
                .await
                .unwrap()
                .unwrap()
        }
    }

    fn zip_payload() -> Value {
        json!({"submission_url": "https://example.com/hw1.zip"})
    }

    #[tokio::test]
    async fn test_accepts_until_attempt_limit() {
        let mut fx = Fixture::new().await;
        let service = fx.service(true);
        let hw = fx.assignment(3, Duration::days(1)).await;

        for _ in 0..3 {
            let submission = service.submit(&fx.user, hw.id, &zip_payload()).await.unwrap();
            assert_eq!(submission.assignment_id, hw.id);
            assert_eq!(submission.user_id, fx.user.id);

            let notice = fx.next_notice().await;
            assert_eq!(notice.status, NoticeStatus::Valid);
            assert_eq!(notice.user_name.as_deref(), Some("Jane Doe"));
            assert_eq!(notice.user_id, Some(fx.user.id));
            assert_eq!(notice.assignment_id, Some(hw.id));
        }

        let err = service.submit(&fx.user, hw.id, &zip_payload()).await.unwrap_err();
        assert!(matches!(err, CoreError::AttemptsExceeded));
        assert_eq!(err.to_string(), "Maximum number of attempts exceeded");
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rejects_after_deadline() {
        let mut fx = Fixture::new().await;
        let service = fx.service(true);
        let hw = fx.assignment(3, Duration::seconds(-60)).await;

        let err = service.submit(&fx.user, hw.id, &zip_payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Deadline has passed");
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_creates_no_row() {
        let mut fx = Fixture::new().await;
        let service = fx.service(true);
        let hw = fx.assignment(3, Duration::days(1)).await;

        let payload = json!({"submission_url": "https://example.com/hw1.tar.gz"});
        let err = service.submit(&fx.user, hw.id, &payload).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 0);

        let notice = fx.next_notice().await;
        assert_eq!(notice.status, NoticeStatus::InvalidUrl);
        assert_eq!(notice.submission_url, "https://example.com/hw1.tar.gz");
        assert_eq!(notice.email, "jane@example.com");
        assert!(notice.user_id.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_file_is_removed() {
        let mut fx = Fixture::new().await;
        let service = fx.service(false);
        let hw = fx.assignment(1, Duration::days(1)).await;

        let err = service.submit(&fx.user, hw.id, &zip_payload()).await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnreachable(_)));
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 0);
        assert_eq!(fx.next_notice().await.status, NoticeStatus::NoFile);

        // The failed attempt does not use up the single allowed attempt
        let service = fx.service(true);
        service.submit(&fx.user, hw.id, &zip_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_assignment() {
        let mut fx = Fixture::new().await;
        let service = fx.service(true);

        let err = service.submit(&fx.user, 999, &zip_payload()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_share_one_attempt() {
        let mut fx = Fixture::new().await;
        let service = fx.service(true);
        let hw = fx.assignment(1, Duration::days(1)).await;

        let payload = zip_payload();
        let (first, second) = tokio::join!(
            service.submit(&fx.user, hw.id, &payload),
            service.submit(&fx.user, hw.id, &payload),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(CoreError::AttemptsExceeded)))
        );
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_database_writable_while_url_check_runs() {
        let mut fx = Fixture::new().await;
        let (service, mut entered, release) = fx.gated_service(true);
        let hw = fx.assignment(2, Duration::days(1)).await;

        let user = fx.user.clone();
        let assignment_id = hw.id;
        let pending = tokio::spawn(async move {
            service
                .submit(&user, assignment_id, &zip_payload())
                .await
        });
        entered.recv().await.unwrap();

        // The attempt is already counted and other writers are not blocked
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 1);
        let insert = fx.db.insert_user(NewUser {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "john@example.com".to_string(),
            password_hash: "unused".to_string(),
        });
        tokio::time::timeout(std::time::Duration::from_secs(2), insert)
            .await
            .unwrap()
            .unwrap();

        release.notify_one();
        let submission = pending.await.unwrap().unwrap();
        assert_eq!(submission.assignment_id, hw.id);
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_request_still_removes_unreachable_row() {
        let mut fx = Fixture::new().await;
        let (service, mut entered, release) = fx.gated_service(false);
        let hw = fx.assignment(1, Duration::days(1)).await;

        let user = fx.user.clone();
        let assignment_id = hw.id;
        let pending = tokio::spawn(async move {
            service
                .submit(&user, assignment_id, &zip_payload())
                .await
        });
        entered.recv().await.unwrap();
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 1);

        // Client goes away mid-check
        pending.abort();
        release.notify_one();

        assert_eq!(fx.next_notice().await.status, NoticeStatus::NoFile);
        assert_eq!(fx.db.count_submissions(hw.id).await.unwrap(), 0);
    }
}

//! Submission notice message

use serde::{Deserialize, Serialize};

/// Outcome reported to the notification webhook
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeStatus {
    Valid,
    InvalidUrl,
    NoFile,
}

impl NoticeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeStatus::Valid => "valid",
            NoticeStatus::InvalidUrl => "invalid_url",
            NoticeStatus::NoFile => "no_file",
        }
    }
}

/// Message emitted once per submission attempt
///
/// `user_name`, `user_id` and `assignment_id` are only present on the
/// `valid` path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionNotice {
    pub submission_url: String,
    pub email: String,
    pub status: NoticeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<i64>,
}

impl SubmissionNotice {
    pub fn valid(
        submission_url: impl Into<String>,
        email: impl Into<String>,
        user_name: impl Into<String>,
        user_id: i64,
        assignment_id: i64,
    ) -> Self {
        Self {
            submission_url: submission_url.into(),
            email: email.into(),
            status: NoticeStatus::Valid,
            user_name: Some(user_name.into()),
            user_id: Some(user_id),
            assignment_id: Some(assignment_id),
        }
    }

    pub fn invalid_url(submission_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self::failure(submission_url, email, NoticeStatus::InvalidUrl)
    }

    pub fn no_file(submission_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self::failure(submission_url, email, NoticeStatus::NoFile)
    }

    fn failure(
        submission_url: impl Into<String>,
        email: impl Into<String>,
        status: NoticeStatus,
    ) -> Self {
        Self {
            submission_url: submission_url.into(),
            email: email.into(),
            status,
            user_name: None,
            user_id: None,
            assignment_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_notice_shape() {
        let notice = SubmissionNotice::valid("https://x.io/a.zip", "j@x.io", "Jane Doe", 3, 9);
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            json!({
                "submission_url": "https://x.io/a.zip",
                "email": "j@x.io",
                "status": "valid",
                "user_name": "Jane Doe",
                "user_id": 3,
                "assignment_id": 9
            })
        );
    }

    #[test]
    fn test_failure_notice_shape() {
        let notice = SubmissionNotice::invalid_url("ftp://x.io/a.rar", "j@x.io");
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            json!({"submission_url": "ftp://x.io/a.rar", "email": "j@x.io", "status": "invalid_url"})
        );

        let notice = SubmissionNotice::no_file("https://x.io/a.zip", "j@x.io");
        assert_eq!(notice.status.as_str(), "no_file");
        assert!(notice.user_id.is_none());
    }
}

//! Coursework Outbound Calls
//!
//! This crate holds the two HTTP calls the API makes to the outside world:
//! probing a submitted archive URL and delivering submission notices to a
//! webhook.

pub mod error;
pub mod notice;
pub mod probe;
pub mod webhook;

pub use error::NotifyError;
pub use notice::{NoticeStatus, SubmissionNotice};
pub use probe::{HttpProbe, HttpProbeConfig, UrlProbe};
pub use webhook::{LogNotifier, Notifier, WebhookNotifier};

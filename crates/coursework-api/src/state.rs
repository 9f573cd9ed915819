//! Application state

use coursework_core::SubmissionService;
use coursework_db::Database;

/// Prometheus render handle exposed at `/metrics`
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub submissions: SubmissionService,
}

impl AppState {
    pub fn new(db: Database, submissions: SubmissionService) -> Self {
        Self { db, submissions }
    }
}

//! Health check endpoint

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tracing::warn;

use crate::state::AppState;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

/// GET /healthz
///
/// 200 when the database answers, 503 otherwise. Never cached.
async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    metrics::counter!("coursework_health_checks_total").increment(1);

    let status = match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, [(header::CACHE_CONTROL, NO_STORE)])
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::CACHE_CONTROL, NO_STORE)])
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz).fallback(method_not_allowed))
}

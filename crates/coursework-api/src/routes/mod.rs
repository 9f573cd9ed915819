//! API routes

mod assignments;
mod extract;
mod health;
pub mod metrics;
mod submissions;
mod types;
mod users;

use axum::Router;

use crate::state::{AppState, MetricsHandle};

pub use extract::{JsonPayload, RequireAuth};
pub use types::*;

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<MetricsHandle>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(assignments::routes())
        .merge(submissions::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::handlers::{validate_handler, AppState};
use crate::server::logging::{health_handler, request_logging_middleware};
use crate::server::updates::{check_update_handler, publish_release_handler};

/// Build the main application router for the Warden server.
///
/// This is a convenience helper so `main.rs` or tests can
/// construct the router in a single call.
///
/// # Routes
///
/// - `POST /validate` - Validate a (username, hardware_id, app_user) triple
/// - `GET /api/check-update` - Serve the update manifest
/// - `POST /api/update-version` - Store a release record
/// - `GET /health` - Service and store health
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/validate", post(validate_handler))
        .route("/api/check-update", get(check_update_handler))
        .route("/api/update-version", post(publish_release_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}

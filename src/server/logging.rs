//! Logging setup and request middleware for Warden.
//!
//! Provides structured logging for all API requests including:
//! - Unique request ID tracking
//! - Request timing
//! - Method, path, and status logging
//! - Request ID propagation in response headers
//!
//! Validation traffic is credential-adjacent, so default-level output never
//! carries raw license rows or full request payloads; handlers log
//! identifiers and outcomes only, with anything more verbose at `debug`.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Response},
    middleware::Next,
    Json,
};
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, info_span, Instrument, Level};
use uuid::Uuid;

use crate::config::WardenConfig;
use crate::server::handlers::AppState;

/// Initialize the global tracing subscriber from configuration.
///
/// Safe to call once at process start; later calls are ignored.
pub fn init_logging(config: &WardenConfig) {
    let level = Level::from_str(&config.logging.level).unwrap_or(Level::INFO);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Header name for the request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Generate a new unique request ID.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Logging middleware that tracks request timing and generates request IDs.
///
/// This middleware:
/// 1. Generates a unique request ID for each incoming request
/// 2. Creates a tracing span with the request ID
/// 3. Logs the request method and path
/// 4. Measures and logs the response time
/// 5. Adds the request ID to the response headers
pub async fn request_logging_middleware(request: Request, next: Next) -> Response<Body> {
    let request_id = generate_request_id();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let start = Instant::now();

    let response = async move {
        info!("Started processing request");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    let duration = start.elapsed();
    let status = response.status();

    let _enter = span.enter();
    info!(
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    // Add request ID to response headers
    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    Response::from_parts(parts, body)
}

/// Health check response structure.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy" or "degraded")
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Store connectivity status
    pub store: StoreHealth,
}

/// Store health status.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreHealth {
    /// Whether the store is reachable
    pub connected: bool,
    /// Store backend (sqlite or postgres)
    pub backend: String,
}

impl HealthResponse {
    /// Create a health response from a connectivity probe.
    pub fn from_probe(connected: bool, backend: &str) -> Self {
        Self {
            status: if connected { "healthy" } else { "degraded" }.to_string(),
            service: "warden".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store: StoreHealth {
                connected,
                backend: backend.to_string(),
            },
        }
    }
}

/// Handler for `GET /health`.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.store.ping().await;
    Json(HealthResponse::from_probe(
        connected,
        state.store.backend_name(),
    ))
}

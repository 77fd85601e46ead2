//! Axum HTTP handlers for the validation endpoint.
//!
//! The transport stays thin: it captures `now`, hands the request to the
//! engine, and maps the outcome to a response shape. Business outcomes
//! (allowed/expired/denied) come back as HTTP 200 with a status label;
//! malformed requests as 400; store failure as a 5xx with a generic body so
//! no internal detail leaks to clients.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::WardenError;
use crate::server::engine::{Outcome, ValidateRequest, ValidationEngine};
use crate::server::store::Store;
use crate::server::updates::UpdateManifest;

/// Shared application state for handlers.
///
/// Everything is constructed once at startup and injected here; handlers
/// hold no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub engine: ValidationEngine,
    pub store: Arc<Store>,
    pub manifest: Option<Arc<UpdateManifest>>,
}

impl AppState {
    pub fn new(store: Arc<Store>, manifest: Option<UpdateManifest>) -> Self {
        Self {
            engine: ValidationEngine::new(store.clone()),
            store,
            manifest: manifest.map(Arc::new),
        }
    }
}

/// Standard error response body for HTTP errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// Map internal WardenError into an HTTP response Axum understands.
///
/// This lets handlers return:
///   WardenResult<Json<T>>
/// and Axum will convert both success and error into HTTP responses.
/// The original error is logged; the response body carries a generic
/// message only.
impl IntoResponse for WardenError {
    fn into_response(self) -> Response {
        let status = match self {
            // Retryable infrastructure trouble.
            WardenError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WardenError::ConfigError(_) | WardenError::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        error!("request failed: {self}");

        (status, Json(ErrorResponse::new("internal server error"))).into_response()
    }
}

/// Response body for a validation business outcome.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub status: Outcome,
}

/// Handler for `POST /validate`.
///
/// `now` is captured once here so the whole decision uses a single time
/// snapshot. Outcome mapping:
/// - `Allowed`/`Expired`/`Denied` → 200 with `{"status": "..."}`
/// - `InvalidRequest` → 400 with an error body
/// - store failure → 5xx via the `IntoResponse` impl above
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Response, WardenError> {
    let now = Utc::now().naive_utc();

    let outcome = state.engine.validate(&req, now).await?;

    // Account identifier and outcome only; usernames, hardware fingerprints
    // and license rows stay out of default-level logs.
    info!(
        app_user = %req.app_user,
        outcome = outcome.as_str(),
        "validation decided"
    );

    let response = match outcome {
        Outcome::InvalidRequest => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "missing username, hardware_id, or app_user",
            )),
        )
            .into_response(),
        outcome => (StatusCode::OK, Json(ValidateResponse { status: outcome })).into_response(),
    };

    Ok(response)
}

//! Update manifest and release record endpoints.
//!
//! The manifest served on `GET /api/check-update` is inert configuration
//! data: a JSON file read once at startup and returned verbatim. File hashes
//! inside it are informational for the client updater; the server never
//! verifies them. `POST /api/update-version` is a plain pass-through insert
//! with no decision logic attached.

use std::path::Path;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{WardenError, WardenResult};
use crate::server::handlers::{AppState, ErrorResponse};
use crate::server::store::NewRelease;
use crate::server::validation::validate_not_empty;

/// One downloadable file entry in the update manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub url: String,
    pub hash: String,
}

/// The update manifest returned to client auto-updaters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateManifest {
    pub version: String,
    pub build: String,
    pub download_url: String,
    pub release_notes: String,
    pub mandatory: bool,
    pub min_version_required: String,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

impl UpdateManifest {
    /// Load the manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> WardenResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WardenError::ServerError(format!(
                "failed to read update manifest {}: {e}",
                path.display()
            ))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            WardenError::ServerError(format!(
                "failed to parse update manifest {}: {e}",
                path.display()
            ))
        })
    }
}

/// Handler for `GET /api/check-update`.
///
/// Returns the manifest loaded at startup, or 404 when none is configured.
pub async fn check_update_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.manifest {
        Some(manifest) => Json(manifest.as_ref().clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no update manifest available")),
        )
            .into_response(),
    }
}

/// Request body for `POST /api/update-version`.
#[derive(Debug, Deserialize)]
pub struct PublishReleaseRequest {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
}

/// Response body for a stored release record.
#[derive(Debug, Serialize)]
pub struct PublishReleaseResponse {
    pub status: &'static str,
    pub id: String,
}

/// Handler for `POST /api/update-version`.
///
/// Stores a release record with a server-assigned id and timestamp.
pub async fn publish_release_handler(
    State(state): State<AppState>,
    Json(req): Json<PublishReleaseRequest>,
) -> Result<axum::response::Response, WardenError> {
    if validate_not_empty(&req.version, "version").is_err() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("missing version")),
        )
            .into_response());
    }

    let release = NewRelease {
        version: req.version,
        build: req.build,
        download_url: req.download_url,
        release_notes: req.release_notes,
        mandatory: req.mandatory,
    };

    let id = state.store.insert_release(&release).await?;

    info!(version = %release.version, id = %id, "release record stored");

    Ok((
        StatusCode::OK,
        Json(PublishReleaseResponse {
            status: "success",
            id,
        }),
    )
        .into_response())
}

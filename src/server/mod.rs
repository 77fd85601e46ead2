// src/server/mod.rs

//! Server-side components for Warden.
//!
//! This module contains:
//! - `store`      → License store adapter over SQLite/Postgres
//! - `engine`     → Validation decision engine
//! - `handlers`   → Axum HTTP handlers for the validation endpoint
//! - `updates`    → Update manifest + release record endpoints
//! - `routes`     → Router builder
//! - `logging`    → Tracing setup, request logging middleware, health
//! - `validation` → Request validation utilities

pub mod engine;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod store;
pub mod updates;
pub mod validation;

// Convenient re-exports so callers can do `warden::server::X`
// instead of digging into submodules.

pub use engine::{decide, Outcome, ValidateRequest, ValidationEngine};
pub use handlers::{validate_handler, AppState, ValidateResponse};
pub use logging::{init_logging, request_logging_middleware, HealthResponse};
pub use routes::build_router;
pub use store::{Account, License, NewRelease, Store};
pub use updates::{
    check_update_handler, publish_release_handler, ManifestFile, PublishReleaseRequest,
    PublishReleaseResponse, UpdateManifest,
};
pub use validation::{validate_not_empty, ValidationError};

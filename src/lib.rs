//! Warden - a license validation and update metadata server.
//!
//! Warden answers one question: is a given (username, hardware fingerprint,
//! account) triple currently entitled to use the product? License records
//! live in an external store; Warden reads them and produces a decision.
//! Alongside the validation endpoint it serves a static update manifest for
//! client auto-updaters.
//!
//! # Features
//!
//! Warden uses feature flags to allow you to include only what you need:
//!
//! - `server` - Server components (handlers, store). Enabled by default.
//! - `sqlite` - SQLite store backend. Enabled by default.
//! - `postgres` - PostgreSQL store backend.

// Core modules (always available)
pub mod config;
pub mod errors;

// Server-related modules (requires "server" feature)
#[cfg(feature = "server")]
#[path = "server/mod.rs"]
pub mod server;

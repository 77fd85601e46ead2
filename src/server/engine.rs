//! Validation decision engine.
//!
//! The engine answers: may this (username, hardware_id, app_user) triple use
//! the product right now? Once the request, the current time, and the fetched
//! account are in hand, the decision is a pure function with no shared state;
//! the only fallible step is the store lookup, whose failure propagates as
//! `Err` rather than a business outcome.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::WardenResult;
use crate::server::store::{Account, Store};
use crate::server::validation::validate_not_empty;

/// A request to validate one activation triple. Transient; never persisted.
///
/// Fields default to empty strings so a missing JSON field and an empty one
/// land in the same `InvalidRequest` branch, decided here rather than by the
/// deserializer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub hardware_id: String,
    #[serde(default)]
    pub app_user: String,
}

/// The closed set of validation outcomes.
///
/// `Allowed`, `Expired` and `Denied` are final business answers; callers must
/// not retry them. `InvalidRequest` means the caller sent a malformed
/// request. Store failure is not an outcome: it surfaces as
/// `Err(WardenError::StoreUnavailable)` and is the only condition a caller
/// may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A matching license exists and its expiration is at or after `now`.
    Allowed,
    /// A matching license exists but its expiration has passed.
    Expired,
    /// No account, no matching license, or a match without an expiration.
    Denied,
    /// One or more required request fields were missing or empty.
    InvalidRequest,
}

impl Outcome {
    /// Wire label for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Allowed => "allowed",
            Outcome::Expired => "expired",
            Outcome::Denied => "denied",
            Outcome::InvalidRequest => "invalid_request",
        }
    }
}

impl ValidateRequest {
    /// Check that all three required fields are present and non-empty.
    pub fn is_well_formed(&self) -> bool {
        validate_not_empty(&self.username, "username").is_ok()
            && validate_not_empty(&self.hardware_id, "hardware_id").is_ok()
            && validate_not_empty(&self.app_user, "app_user").is_ok()
    }
}

/// Decide access for a request against an already-fetched account.
///
/// Pure function of its inputs. Rules:
/// - no account → `Denied`
/// - licenses are scanned in stored order; the first entry whose `username`
///   and `hardware_id` both match exactly (case-sensitive) wins, even if
///   duplicates exist later
/// - no match → `Denied`
/// - match without a recorded expiration → `Denied` (a license row with no
///   expiration is never active access; it does not mean "never expires")
/// - match with `expiration >= now` → `Allowed` (boundary inclusive)
/// - match with `expiration < now` → `Expired`
pub fn decide(req: &ValidateRequest, account: Option<&Account>, now: NaiveDateTime) -> Outcome {
    let Some(account) = account else {
        debug!(app_user = %req.app_user, "account not found");
        return Outcome::Denied;
    };

    let matched = account
        .licenses
        .iter()
        .find(|l| l.username == req.username && l.hardware_id == req.hardware_id);

    match matched {
        None => {
            debug!(app_user = %req.app_user, "no license for username/hardware pair");
            Outcome::Denied
        }
        Some(license) => match license.expiration {
            None => {
                debug!(app_user = %req.app_user, "matched license has no expiration");
                Outcome::Denied
            }
            Some(expiration) if expiration >= now => Outcome::Allowed,
            Some(_) => Outcome::Expired,
        },
    }
}

/// The validation engine, wrapping the store adapter.
///
/// Constructed once at startup with an explicitly injected store; cloning is
/// cheap and shares the underlying pool.
#[derive(Clone)]
pub struct ValidationEngine {
    store: Arc<Store>,
}

impl ValidationEngine {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Validate a request against the store at time `now`.
    ///
    /// `now` is captured once by the caller at the start of the request so a
    /// single consistent expiration judgment applies to the whole call.
    /// Store failure propagates as `Err(WardenError::StoreUnavailable)` and
    /// is never coerced into `Denied`.
    pub async fn validate(
        &self,
        req: &ValidateRequest,
        now: NaiveDateTime,
    ) -> WardenResult<Outcome> {
        if !req.is_well_formed() {
            return Ok(Outcome::InvalidRequest);
        }

        let account = self.store.find_account(&req.app_user).await?;
        Ok(decide(req, account.as_ref(), now))
    }
}

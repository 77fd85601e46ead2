use thiserror::Error;

/// Error taxonomy for Warden.
///
/// Business answers (allowed/expired/denied) are not errors; they are
/// `Outcome` values produced by the validation engine. This enum covers only
/// the conditions where the server itself failed to produce an answer.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The license store could not be reached or a query against it failed.
    ///
    /// This must never be collapsed into a "denied" outcome: an outage has
    /// to stay distinguishable from a revoked license.
    #[error("license store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other internal failure (I/O, serialization, ...).
    #[error("server error: {0}")]
    ServerError(String),
}

/// Result alias used throughout the crate.
pub type WardenResult<T> = Result<T, WardenError>;

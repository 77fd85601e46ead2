//! Configuration system for Warden.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `config.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! All configuration options can be overridden via environment variables:
//! - `WARDEN_SERVER_HOST` - Server bind address
//! - `WARDEN_SERVER_PORT` - Server port
//! - `WARDEN_DATABASE_TYPE` - Store backend ("sqlite" or "postgres")
//! - `WARDEN_DATABASE_URL` - Store connection URL
//! - `WARDEN_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//! - `WARDEN_UPDATE_MANIFEST` - Path to the update manifest JSON file

use config::Config;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;

use crate::errors::{WardenError, WardenResult};

/// Global configuration singleton.
static CONFIG: OnceLock<WardenConfig> = OnceLock::new();

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// License store configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Update manifest configuration
    pub update: UpdateConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// License store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Store backend: "sqlite" or "postgres"
    pub db_type: String,
    /// SQLite connection URL
    pub sqlite_url: String,
    /// PostgreSQL connection URL
    pub postgres_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            sqlite_url: "sqlite://warden.db".to_string(),
            postgres_url: "postgres://localhost/warden".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Update manifest configuration.
///
/// The manifest served on `/api/check-update` is inert data read once at
/// startup; there is no logic attached to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Path to the update manifest JSON file
    pub manifest_path: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_path: "update_manifest.json".to_string(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` file (optional)
    /// 3. Environment variables
    fn load() -> WardenResult<Self> {
        let builder = Config::builder()
            // Start with defaults
            .set_default("server.host", "127.0.0.1")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("server.port", 3000)
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("database.db_type", "sqlite")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("database.sqlite_url", "sqlite://warden.db")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("database.postgres_url", "postgres://localhost/warden")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("logging.level", "info")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_default("update.manifest_path", "update_manifest.json")
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            // Load from config.toml (optional)
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            .set_override_option("server.host", env::var("WARDEN_SERVER_HOST").ok())
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option(
                "server.port",
                env::var("WARDEN_SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option("database.db_type", env::var("WARDEN_DATABASE_TYPE").ok())
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option(
                "database.sqlite_url",
                env::var("WARDEN_DATABASE_URL")
                    .ok()
                    .filter(|url| url.starts_with("sqlite")),
            )
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option(
                "database.postgres_url",
                env::var("WARDEN_DATABASE_URL")
                    .ok()
                    .filter(|url| url.starts_with("postgres")),
            )
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option("logging.level", env::var("WARDEN_LOG_LEVEL").ok())
            .map_err(|e| WardenError::ConfigError(e.to_string()))?
            .set_override_option(
                "update.manifest_path",
                env::var("WARDEN_UPDATE_MANIFEST").ok(),
            )
            .map_err(|e| WardenError::ConfigError(e.to_string()))?;

        let settings = builder
            .build()
            .map_err(|e| WardenError::ConfigError(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| WardenError::ConfigError(format!("failed to deserialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> WardenResult<()> {
        if self.server.port == 0 {
            return Err(WardenError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        match self.database.db_type.as_str() {
            "sqlite" | "postgres" => {}
            other => {
                return Err(WardenError::ConfigError(format!(
                    "database.db_type must be 'sqlite' or 'postgres', got '{other}'"
                )));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(WardenError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }
}

/// Get the global configuration.
///
/// This loads the configuration on first access and caches it.
/// Returns an error if configuration loading or validation fails.
pub fn get_config() -> WardenResult<&'static WardenConfig> {
    // Check if already initialized
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    // Load and validate configuration
    let config = WardenConfig::load()?;
    config.validate()?;

    // Try to set it (ignore if another thread beat us)
    let _ = CONFIG.set(config.clone());

    // Return the stored config (either ours or another thread's)
    Ok(CONFIG.get().expect("config was just set"))
}

/// Initialize configuration explicitly.
///
/// Call this early in your application to catch configuration errors.
/// Returns the validated configuration.
pub fn init_config() -> WardenResult<&'static WardenConfig> {
    get_config()
}

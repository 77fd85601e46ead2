//! License store adapter.
//!
//! Licenses are owned and written by an external system; this server only
//! reads them. The adapter keeps infrastructure failures strictly separate
//! from "no license found": a query error surfaces as
//! [`WardenError::StoreUnavailable`] and is never folded into an empty
//! result.

use chrono::{NaiveDateTime, Utc};
use sqlx::{query, query_as, FromRow};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

#[cfg(feature = "sqlite")]
use sqlx::SqlitePool;

#[cfg(feature = "postgres")]
use sqlx::PgPool;

use crate::config::get_config;
use crate::errors::{WardenError, WardenResult};

/// One activation binding: a human user tied to a hardware fingerprint.
///
/// `expiration` is an explicit optional. A record without an expiration is
/// never treated as active access; that policy lives in the engine, but the
/// type makes the absent case impossible to overlook.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct License {
    pub username: String,
    pub hardware_id: String,
    pub expiration: Option<NaiveDateTime>,
}

/// An account (`app_user`) and the licenses issued under it.
///
/// `licenses` preserves stored order; when duplicate (username, hardware_id)
/// pairs exist, the first stored row is the one that decides.
#[derive(Debug, Clone)]
pub struct Account {
    pub app_user: String,
    pub licenses: Vec<License>,
}

/// A release record to be stored via the update-version endpoint.
#[derive(Debug, Clone)]
pub struct NewRelease {
    pub version: String,
    pub build: Option<String>,
    pub download_url: Option<String>,
    pub release_notes: Option<String>,
    pub mandatory: bool,
}

/// Unified store abstraction over SQLite and Postgres.
///
/// Available variants depend on enabled features:
/// - `sqlite` feature enables `Store::SQLite`
/// - `postgres` feature enables `Store::Postgres`
#[derive(Debug, Clone)]
pub enum Store {
    #[cfg(feature = "sqlite")]
    SQLite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

impl Store {
    /// Open the store connection based on configuration.
    ///
    /// Uses the global configuration from `config.toml` and environment
    /// variables. See `crate::config` for configuration options.
    pub async fn connect() -> WardenResult<Arc<Self>> {
        let config = get_config()?;
        let db_config = &config.database;

        match db_config.db_type.as_str() {
            #[cfg(feature = "sqlite")]
            "sqlite" => {
                let pool = SqlitePool::connect(&db_config.sqlite_url)
                    .await
                    .map_err(|e| {
                        error!("Failed to connect to SQLite: {e}");
                        WardenError::StoreUnavailable(format!("failed to connect to SQLite: {e}"))
                    })?;

                Ok(Arc::new(Store::SQLite(pool)))
            }
            #[cfg(not(feature = "sqlite"))]
            "sqlite" => Err(WardenError::ConfigError(
                "SQLite support not compiled in. Enable the 'sqlite' feature.".to_string(),
            )),
            #[cfg(feature = "postgres")]
            "postgres" => {
                let pool = PgPool::connect(&db_config.postgres_url)
                    .await
                    .map_err(|e| {
                        error!("Failed to connect to PostgreSQL: {e}");
                        WardenError::StoreUnavailable(format!(
                            "failed to connect to PostgreSQL: {e}"
                        ))
                    })?;

                Ok(Arc::new(Store::Postgres(pool)))
            }
            #[cfg(not(feature = "postgres"))]
            "postgres" => Err(WardenError::ConfigError(
                "PostgreSQL support not compiled in. Enable the 'postgres' feature.".to_string(),
            )),
            other => Err(WardenError::ConfigError(format!(
                "unsupported database type: {other}"
            ))),
        }
    }

    /// Create the `licenses` and `releases` tables if they do not exist.
    pub async fn migrate(&self) -> WardenResult<()> {
        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => {
                query(
                    r#"
                    CREATE TABLE IF NOT EXISTS licenses (
                        id          INTEGER PRIMARY KEY AUTOINCREMENT,
                        app_user    TEXT NOT NULL,
                        username    TEXT NOT NULL,
                        hardware_id TEXT NOT NULL,
                        expiration  TEXT
                    );
                    "#,
                )
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("SQLite migrate (licenses) failed: {e}");
                    WardenError::StoreUnavailable(format!("migration error: {e}"))
                })?;

                query(
                    r#"
                    CREATE TABLE IF NOT EXISTS releases (
                        id            TEXT PRIMARY KEY,
                        version       TEXT NOT NULL,
                        build         TEXT,
                        download_url  TEXT,
                        release_notes TEXT,
                        mandatory     INTEGER NOT NULL DEFAULT 0,
                        created_at    TEXT NOT NULL
                    );
                    "#,
                )
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("SQLite migrate (releases) failed: {e}");
                    WardenError::StoreUnavailable(format!("migration error: {e}"))
                })?;
            }
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => {
                query(
                    r#"
                    CREATE TABLE IF NOT EXISTS licenses (
                        id          BIGSERIAL PRIMARY KEY,
                        app_user    TEXT NOT NULL,
                        username    TEXT NOT NULL,
                        hardware_id TEXT NOT NULL,
                        expiration  TIMESTAMP
                    );
                    "#,
                )
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("Postgres migrate (licenses) failed: {e}");
                    WardenError::StoreUnavailable(format!("migration error: {e}"))
                })?;

                query(
                    r#"
                    CREATE TABLE IF NOT EXISTS releases (
                        id            TEXT PRIMARY KEY,
                        version       TEXT NOT NULL,
                        build         TEXT,
                        download_url  TEXT,
                        release_notes TEXT,
                        mandatory     BOOLEAN NOT NULL DEFAULT FALSE,
                        created_at    TIMESTAMP NOT NULL
                    );
                    "#,
                )
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("Postgres migrate (releases) failed: {e}");
                    WardenError::StoreUnavailable(format!("migration error: {e}"))
                })?;
            }
        }

        Ok(())
    }

    /// Fetch an account and its license set by `app_user`.
    ///
    /// Returns:
    /// - `Ok(Some(Account))` if the account has at least one license row
    /// - `Ok(None)` if no rows exist for this `app_user`
    /// - `Err(WardenError::StoreUnavailable)` on store failure
    ///
    /// Licenses come back in stored (insertion) order. `app_user` is not
    /// validated here; emptiness checks are the caller's responsibility.
    pub async fn find_account(&self, app_user: &str) -> WardenResult<Option<Account>> {
        let licenses = match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => query_as::<_, License>(
                "SELECT username, hardware_id, expiration \
                     FROM licenses WHERE app_user = ? ORDER BY id",
            )
            .bind(app_user)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                error!("SQLite find_account failed: {e}");
                WardenError::StoreUnavailable(format!("store query error: {e}"))
            })?,
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => query_as::<_, License>(
                "SELECT username, hardware_id, expiration \
                     FROM licenses WHERE app_user = $1 ORDER BY id",
            )
            .bind(app_user)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                error!("Postgres find_account failed: {e}");
                WardenError::StoreUnavailable(format!("store query error: {e}"))
            })?,
        };

        if licenses.is_empty() {
            return Ok(None);
        }

        Ok(Some(Account {
            app_user: app_user.to_string(),
            licenses,
        }))
    }

    /// Insert a license row for an account.
    ///
    /// Issuance is out of scope for the server itself; this exists for
    /// seeding and tests. Rows are appended, preserving stored order.
    pub async fn insert_license(&self, app_user: &str, license: &License) -> WardenResult<()> {
        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => {
                query(
                    "INSERT INTO licenses (app_user, username, hardware_id, expiration) \
                         VALUES (?, ?, ?, ?)",
                )
                .bind(app_user)
                .bind(&license.username)
                .bind(&license.hardware_id)
                .bind(license.expiration)
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("SQLite insert_license failed: {e}");
                    WardenError::StoreUnavailable(format!("store query error: {e}"))
                })?;
            }
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => {
                query(
                    "INSERT INTO licenses (app_user, username, hardware_id, expiration) \
                         VALUES ($1, $2, $3, $4)",
                )
                .bind(app_user)
                .bind(&license.username)
                .bind(&license.hardware_id)
                .bind(license.expiration)
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("Postgres insert_license failed: {e}");
                    WardenError::StoreUnavailable(format!("store query error: {e}"))
                })?;
            }
        }

        Ok(())
    }

    /// Store a release record and return its generated id.
    pub async fn insert_release(&self, release: &NewRelease) -> WardenResult<String> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().naive_utc();

        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => {
                query(
                    "INSERT INTO releases \
                         (id, version, build, download_url, release_notes, mandatory, created_at) \
                         VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(&release.version)
                .bind(&release.build)
                .bind(&release.download_url)
                .bind(&release.release_notes)
                .bind(release.mandatory)
                .bind(created_at)
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("SQLite insert_release failed: {e}");
                    WardenError::StoreUnavailable(format!("store query error: {e}"))
                })?;
            }
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => {
                query(
                    "INSERT INTO releases \
                         (id, version, build, download_url, release_notes, mandatory, created_at) \
                         VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(&id)
                .bind(&release.version)
                .bind(&release.build)
                .bind(&release.download_url)
                .bind(&release.release_notes)
                .bind(release.mandatory)
                .bind(created_at)
                .execute(pool)
                .await
                .map_err(|e| {
                    error!("Postgres insert_release failed: {e}");
                    WardenError::StoreUnavailable(format!("store query error: {e}"))
                })?;
            }
        }

        Ok(id)
    }

    /// Check store connectivity with a trivial query.
    pub async fn ping(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => query("SELECT 1").execute(pool).await.is_ok(),
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => query("SELECT 1").execute(pool).await.is_ok(),
        }
    }

    /// Name of the configured backend, for health reporting.
    pub fn backend_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            Store::Postgres(_) => "postgres",
        }
    }

    /// Close the underlying connection pool.
    ///
    /// Called during shutdown; queries issued afterwards fail with
    /// `StoreUnavailable`.
    pub async fn close(&self) {
        match self {
            #[cfg(feature = "sqlite")]
            Store::SQLite(pool) => pool.close().await,
            #[cfg(feature = "postgres")]
            Store::Postgres(pool) => pool.close().await,
        }
    }
}

//! Warden server binary.
//!
//! Startup order: configuration, logging, store connection + migration,
//! update manifest, router. The store is opened once here and closed on
//! shutdown; nothing else in the process holds connection state.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use warden::config::init_config;
use warden::server::handlers::AppState;
use warden::server::logging::init_logging;
use warden::server::routes::build_router;
use warden::server::store::Store;
use warden::server::updates::UpdateManifest;

#[tokio::main]
async fn main() {
    let config = match init_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_logging(config);

    let store = match Store::connect().await {
        Ok(store) => store,
        Err(e) => {
            error!("failed to open license store: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = store.migrate().await {
        error!("failed to run store migrations: {e}");
        std::process::exit(1);
    }

    // The manifest is optional: without one, /api/check-update answers 404.
    let manifest = match UpdateManifest::load(&config.update.manifest_path) {
        Ok(manifest) => {
            info!(
                path = %config.update.manifest_path,
                version = %manifest.version,
                "update manifest loaded"
            );
            Some(manifest)
        }
        Err(e) => {
            warn!("update manifest not loaded: {e}");
            None
        }
    };

    let state = AppState::new(store.clone(), manifest);
    let app = build_router(state);

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .unwrap_or_else(|_| std::net::IpAddr::from([127, 0, 0, 1])),
        config.server.port,
    );

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    info!("Warden server listening on http://{addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {e}");
    }

    info!("shutting down, closing license store");
    store.close().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install shutdown signal handler: {e}");
    }
}

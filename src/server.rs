//! HTTP server initialization and runtime setup.
//!
//! Picks the storage backend, applies migrations and runs the Axum server until
//! Ctrl-C or SIGTERM.

use crate::application::services::DeviceService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::DeviceRepository;
use crate::infrastructure::database;
use crate::infrastructure::persistence::{InMemoryDeviceRepository, PgDeviceRepository};
use crate::observability::AppMetrics;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - the device repository (PostgreSQL with migrations, or in-memory)
/// - Prometheus metrics
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;
    let device_service = Arc::new(DeviceService::new(repository));
    let metrics = Arc::new(AppMetrics::new().context("Failed to register metrics")?);

    let state = AppState::new(device_service, metrics, &config);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_repository(config: &Config) -> Result<Arc<dyn DeviceRepository>> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = database::connect(config).await?;
            database::run_migrations(&pool).await?;
            Ok(Arc::new(PgDeviceRepository::new(Arc::new(pool))))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(Arc::new(InMemoryDeviceRepository::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

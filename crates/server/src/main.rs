//! SatyaMatrix server entry point.

use std::sync::Arc;

use satya_api::{AppState, app};
use satya_common::{Config, StorageConfig, storage};
use satya_core::{AdminPolicy, JwtIdentityProvider};
use tokio::signal;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satya=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting satya-matrix server...");

    let config = Config::load()?;

    let db = satya_db::init(&config).await?;
    info!("Running database migrations...");
    satya_db::migrate(&db).await?;
    info!("Migrations completed");

    // A storage outage must not keep the API down; uploads fail until it recovers.
    let blob_storage = storage::from_config(&config.storage)?;
    if let Err(e) = blob_storage.ensure_ready().await {
        warn!(error = %e, "Blob storage is not ready");
    }

    let identity = Arc::new(JwtIdentityProvider::new(
        &config.auth.jwt_secret,
        config.auth.jwt_audience.as_deref(),
    ));
    if config.auth.admin_emails.is_empty() {
        warn!("No admin emails configured; only tokens with the admin role can delete reports");
    }
    let authorizer = Arc::new(AdminPolicy::new(identity, &config.auth.admin_emails));

    let state = AppState::new(Arc::new(db), blob_storage, authorizer);
    let mut router = app(state);

    if let StorageConfig::Local {
        base_path,
        mount_path,
        ..
    } = &config.storage
    {
        info!(path = %base_path.display(), mount = %mount_path, "Serving local uploads");
        router = router.nest_service(mount_path, ServeDir::new(base_path));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {} ({})", addr, config.server.url);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

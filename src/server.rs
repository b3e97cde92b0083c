//! Process lifecycle: logging setup, listener, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, LogFormat};
use crate::database::{DocumentStore, PgStore};
use crate::state::AppState;

/// Initialize tracing with EnvFilter. Defaults to info for this crate when RUST_LOG is unset.
pub fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "anyshare_admin_api=info,tower_http=info".into());

    let json_layer = (format == LogFormat::Json).then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (format == LogFormat::Text).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Connect the store and serve until a termination signal arrives.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Anyshare admin API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = Arc::new(
        PgStore::connect(&config.database)
            .await
            .context("failed to connect to the database")?,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let grace = Duration::from_secs(config.api.shutdown_grace_secs);
    let app = crate::app(AppState::new(config, store.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown requested, draining in-flight requests");
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                error!("Requests still running after {:?}, forcing exit", grace);
                std::process::exit(1);
            });
        })
        .await
        .context("server error")?;

    store.close().await;
    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C, SIGTERM, SIGHUP or SIGQUIT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
            signal(SignalKind::quit()),
        ) {
            (Ok(mut term), Ok(mut hup), Ok(mut quit)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = hup.recv() => {},
                    _ = quit.recv() => {},
                }
            }
            _ => {
                error!("Failed to install signal handlers");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

use anyhow::Result;
use axum::{Router, middleware, routing::get};
use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::AppState;
use crate::bookmarks::{get_bookmark, list_bookmarks};
use crate::config::{AppConfig, DatabaseConfig};
use crate::health::handlers::{liveness_handler, readiness_handler};
use crate::logging::trace_requests;
use crate::middleware::{metrics_middleware, require_bearer_token};
use crate::observability::metrics_endpoint;
use crate::services::{BookmarkStore, SqliteBookmarkStore};

/// Start the HTTP server and run until SIGINT/SIGTERM
pub async fn start_server(config: AppConfig) -> Result<()> {
    info!(
        "Starting bookmarks API on {}:{}",
        config.server.bind, config.server.port
    );

    let store = open_store(&config.database)?;
    let state = AppState::new(store, config.auth.clone());

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {}. Is another process using this port?",
            bind_addr,
            e
        )
    })?;
    info!("Server successfully bound to {}", bind_addr);

    serve(
        listener,
        state,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout),
    )
    .await
}

/// Open the configured bookmark store
pub fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn BookmarkStore>> {
    let store = SqliteBookmarkStore::open(&config.url)
        .map_err(|e| anyhow::anyhow!("Failed to open bookmark store: {}", e))?;
    Ok(Arc::new(store))
}

/// Serve `state` on an already bound listener until `shutdown` resolves.
///
/// In-flight requests get `drain_timeout` to finish once shutdown begins.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
    drain_timeout: Duration,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let health = state.health.clone();
    let app = create_router(state);

    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            let _ = draining_tx.send(());
        })
        .into_future();

    health.mark_ready().await;

    tokio::select! {
        result = server => result?,
        _ = async {
            if draining_rx.await.is_ok() {
                tokio::time::sleep(drain_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(timeout_seconds = drain_timeout.as_secs(), "Graceful shutdown timed out, dropping open connections");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Create the router with all routes and middleware.
///
/// Bookmark routes sit behind the bearer-token gate; health and metrics
/// routes stay open for probes and scrapers.
pub fn create_router(state: AppState) -> Router {
    let bookmark_routes: Router<AppState> = Router::new()
        .route("/bookmarks", get(list_bookmarks))
        .route("/bookmarks/{id}", get(get_bookmark))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.auth),
            require_bearer_token,
        ));

    Router::new()
        .merge(bookmark_routes)
        .route("/metrics", get(metrics_endpoint))
        .route("/health", get(liveness_handler))
        .route("/health/liveness", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/health/readiness", get(readiness_handler))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(trace_requests))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

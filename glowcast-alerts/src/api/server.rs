//! HTTP server setup and routing
//!
//! Sets up the Axum server with the operator control endpoints and the
//! overlay SSE stream.

use crate::builder::{AlertBuilder, EventActionRepository};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::overlay::OverlayTransport;
use crate::queue::{AlertQueue, SpeechQueue};
use axum::{
    routing::{get, post},
    Router,
};
use glowcast_common::events::EventBus;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>` for
/// free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub alert_queue: Arc<AlertQueue>,
    pub speech_queue: Arc<SpeechQueue>,
    pub transport: Arc<OverlayTransport>,
    pub builder: Arc<AlertBuilder>,
    pub repo: Arc<dyn EventActionRepository>,
    pub ui_bus: EventBus,
}

/// Build the application router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))

        // Alert queue control
        .route("/alerts/test", post(super::handlers::send_test_alert))
        .route("/alerts/clear", post(super::handlers::clear_alerts))
        .route("/alerts/queue", get(super::handlers::alert_queue_status))

        // Speech queue control
        .route("/speech", post(super::handlers::enqueue_speech))
        .route("/speech/enabled", post(super::handlers::set_speech_enabled))
        .route("/speech/queue", get(super::handlers::speech_queue_status))

        // Overlay surface
        .route("/overlay/events", get(super::sse::event_stream))
        .route("/overlay/speech/complete", post(super::handlers::speech_complete))
        .route("/overlay/stats", get(super::handlers::overlay_stats))

        // Attach application context
        .with_state(ctx)

        // Overlay renderers load from broadcast software's embedded browser
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until the process shuts down
pub async fn run(config: &Config, ctx: AppContext) -> Result<()> {
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

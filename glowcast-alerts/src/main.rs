//! Glowcast alert dispatcher - Main entry point
//!
//! Wires the alert pipeline together: event action lookup, alert
//! building, the paced alert and speech queues, and the HTTP surface
//! (operator control endpoints plus the overlay SSE stream).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glowcast_alerts::api::{self, AppContext};
use glowcast_alerts::builder::{AlertBuilder, BasicFormatter};
use glowcast_alerts::config::Config;
use glowcast_alerts::db::{init::init_schema, SqliteEventActionRepository};
use glowcast_alerts::overlay::OverlayTransport;
use glowcast_alerts::queue::{AlertQueue, OverlaySink, SpeechQueue, UiSink};
use glowcast_common::events::EventBus;

/// Command-line arguments for glowcast-alerts
#[derive(Parser, Debug)]
#[command(name = "glowcast-alerts")]
#[command(about = "Alert dispatcher service for Glowcast")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "GLOWCAST_ALERTS_PORT")]
    port: Option<u16>,

    /// Path to the sqlite database holding event action configs
    #[arg(short, long, env = "GLOWCAST_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Root folder relative media paths resolve against
    #[arg(short, long, env = "GLOWCAST_MEDIA_ROOT")]
    media_root: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long, env = "GLOWCAST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glowcast_alerts=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::resolve(
        args.port,
        args.db_path,
        args.media_root,
        args.config.as_deref(),
    )
    .context("Failed to resolve configuration")?;

    info!("Starting Glowcast alert dispatcher on port {}", config.port);
    info!("Database: {}", config.db_path.display());
    info!("Media root: {}", config.media_root.display());

    // Open the database and ensure the schema exists
    let connect_options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("Failed to open database")?;
    init_schema(&pool).await.context("Failed to initialize schema")?;

    // Event plumbing: local UI bus plus the overlay broadcast transport
    let ui_bus = EventBus::new(256);
    let transport = OverlayTransport::new(256);
    transport.start();

    // Queues deliver to both dispatch sinks
    let alert_queue = AlertQueue::new(
        config.tuning.clone(),
        vec![
            Arc::new(UiSink::new(ui_bus.clone())),
            Arc::new(OverlaySink::new(Arc::clone(&transport))),
        ],
    );
    let speech_queue = SpeechQueue::new(
        config.tuning.clone(),
        Arc::clone(&transport),
        ui_bus.clone(),
    );

    let builder = Arc::new(AlertBuilder::new(
        Box::new(BasicFormatter),
        config.media_root.clone(),
    ));
    let repo = Arc::new(SqliteEventActionRepository::new(pool));

    let ctx = AppContext {
        alert_queue: Arc::clone(&alert_queue),
        speech_queue: Arc::clone(&speech_queue),
        transport: Arc::clone(&transport),
        builder,
        repo,
        ui_bus,
    };

    api::run(&config, ctx).await.context("Server error")?;

    // Stop accepting work before the drain tasks are dropped
    transport.stop();
    alert_queue.clear();
    speech_queue.set_enabled(false);

    info!("Server shutdown complete");
    Ok(())
}

//! WSeries Server
//!
//! Control-plane daemon for WSeries power-delivery controllers: serves the
//! runtime configuration over HTTP, persists accepted changes, and pushes
//! telemetry over a WebSocket.
//!
//! # Storage
//!
//! The runtime configuration lives at `<data_dir>/<namespace>/<key>.json`.
//! With `--ephemeral` it is kept in memory only and lost on exit.

mod api;
mod config;
mod telemetry;

use anyhow::Result;
use api::AppState;
use clap::Parser;
use config::{BootSource, ConfigService, ConfigStore, FileStore, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use telemetry::TelemetryHub;
use tokio::signal;
use tracing::{info, warn};
use wseries_core::default_config_path;

/// WSeries API Server
#[derive(Parser, Debug)]
#[command(name = "wseriesd")]
#[command(version, about = "WSeries Controller API Server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server bind address (overrides config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Keep the runtime configuration in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose);

    info!("WSeries Server starting...");

    // Determine config path: CLI flag > env var > default
    let config_path = args.config.unwrap_or_else(|| {
        std::env::var("WSERIES_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });
    info!("Configuration file: {}", config_path.display());

    // Step 1: Load static configuration
    let static_config = config::load_static_config(&config_path).await?;
    info!("  Data directory: {}", static_config.data_dir.display());

    let server_config = &static_config.server;
    let bind = args.bind.unwrap_or_else(|| server_config.bind.clone());
    let port = args.port.unwrap_or(server_config.port);
    let bind_addr = format!("{}:{}", bind, port);

    // Step 2: Open the store and bring up the configuration service
    let store: Arc<dyn ConfigStore> = if args.ephemeral {
        info!("Ephemeral mode: runtime configuration will not survive restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(
            &static_config.data_dir,
            &static_config.storage.namespace,
            &static_config.storage.key,
        ))
    };

    let service = ConfigService::initialize(store).await;
    match service.boot_source() {
        BootSource::Store => info!("Runtime configuration loaded from store"),
        BootSource::DefaultsAbsent => info!("Runtime configuration initialized to defaults"),
        BootSource::DefaultsCorrupt(reason) | BootSource::DefaultsInvalid(reason) => {
            warn!("Runtime configuration reset to defaults: {}", reason)
        }
    }

    // Step 3: Telemetry
    let telemetry = TelemetryHub::new();
    let ticker = telemetry.spawn_ticker(Duration::from_millis(
        server_config.telemetry_interval_ms.max(1),
    ));

    // Step 4: Create application state
    let app_state = AppState::new(
        Arc::new(service),
        telemetry,
        static_config.capabilities,
    );

    // Set up API router
    let app = api::create_router(app_state, server_config.static_dir.as_deref());

    // Start server
    info!("Starting server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("WSeries API Server listening on {}", bind_addr);
    info!("Server ready!");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ticker.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
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
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! DE1-SoC Panel Server
//!
//! Standalone HTTP server for the push-buttons and 7-segment displays.
//! See [`fpga_panel::config`] for build-time and runtime configuration.

use axum::Router;
use fpga_panel::api::{self, PanelState};
use fpga_panel::config::{self, BoardConfig, DEFAULT_LW_BRIDGE_BASE, DEFAULT_PORT};
use fpga_panel::Board;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fpga_panel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    tracing::info!("Panel server starting...");
    tracing::info!("Build defaults: port={}, lw_bridge={}", DEFAULT_PORT, DEFAULT_LW_BRIDGE_BASE);

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Using bridge window: 0x{:08X} (+0x{:X})", config.base_addr, config.span);

    let board = match Board::open(&config) {
        Ok(board) => board,
        Err(e) => {
            tracing::error!("Failed to map panel at 0x{:08X}: {}", config.base_addr, e);
            tracing::error!("Make sure you have permission to access {} (run as root)", config.device.display());
            std::process::exit(1);
        }
    };

    let state = Arc::new(PanelState::new(board, config.base_addr));

    let app = Router::new()
        .nest("/api/panel", api::panel_router(state.clone()))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config::port_from_env()));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    // The router has been dropped, so this is the last reference
    match Arc::try_unwrap(state) {
        Ok(state) => {
            let board = state.into_board();
            if let Err(e) = board.clear().and_then(|_| board.close()) {
                tracing::error!("Failed to release panel: {}", e);
            }
        }
        Err(_) => tracing::warn!("Panel still shared at shutdown, leaving release to drop"),
    }

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

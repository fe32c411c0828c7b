//! chatdj HTTP server - Main entry point
//!
//! Serves the Spotify playback endpoints and the conversational `/chat`
//! endpoint for the chat frontend.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chatdj_server::{build_router, startup, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;

/// Command-line arguments for chatdj-server
#[derive(Parser, Debug)]
#[command(name = "chatdj-server")]
#[command(about = "Chat-driven Spotify playback server")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "CHATDJ_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, env = "CHATDJ_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "CHATDJ_PORT")]
    port: Option<u16>,

    /// Log level (overrides `[logging] level` and CHATDJ_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = startup::load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    startup::init_tracing(startup::log_level(args.log_level.as_deref(), &config));
    startup::log_startup("chatdj-server", &source);

    let state = AppState::from_config(&config).context("Failed to initialize services")?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    info!("Starting HTTP server on {}", addr);
    info!("Allowing CORS origin {}", config.server.allowed_origin);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! Keygate - JWT-gated user account service

use anyhow::{Context, Result};
use axum::http::header::HeaderName;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::Config;
use keygate_api::{create_router, AppState};
use keygate_auth::{AuthGate, KeyStore, TokenIssuer, TokenVerifier};
use keygate_db::Database;

/// Keygate - JWT-gated user account service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "KEYGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "KEYGATE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Keygate v{}", env!("CARGO_PKG_VERSION"));

    // Load the signing key pair. This is the one fatal startup step:
    // the server must not come up without valid key material.
    let keys = Arc::new(
        KeyStore::load(&config.auth.private_key_path, &config.auth.public_key_path)
            .context("Could not load the signing key pair")?,
    );

    // Initialize database
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Wire the issuer, verifier, and gate around the shared key pair
    let issuer = Arc::new(TokenIssuer::new(keys.clone(), config.auth.token_ttl_hours));
    let verifier = Arc::new(TokenVerifier::new(keys).with_leeway(config.auth.leeway_secs));
    let token_header: HeaderName = config
        .auth
        .token_header
        .parse()
        .context("Invalid auth.token_header in configuration")?;
    let gate = AuthGate::new(verifier).with_header(token_header);

    // Create application state and router
    let state = AppState::new(db, issuer, gate);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

//! knectar-site - portfolio site server
//!
//! Serves the static site with server-side navigation and content, persists
//! menu edits and proxies text-to-speech requests.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use knectar_site::config::SiteConfig;
use knectar_site::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for knectar-site
#[derive(Parser, Debug)]
#[command(name = "knectar-site")]
#[command(about = "KNECTAR portfolio site server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "KNECTAR_PORT")]
    port: u16,

    /// Directory holding the site's HTML, assets and data/menu.json
    #[arg(short, long, default_value = ".", env = "KNECTAR_SITE_ROOT")]
    site_root: PathBuf,

    /// TOML file with editor credentials and TTS settings
    #[arg(short, long, env = "KNECTAR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a .env file next to the site
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "knectar_site=info,knectar_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting KNECTAR site (knectar-site) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = SiteConfig::load(&args.site_root, args.config.as_deref())
        .context("Failed to load configuration")?;
    info!("Site root: {}", config.site_root.display());
    info!("Menu file: {}", config.menu_path().display());

    let state = AppState::new(config).context("Failed to initialize TTS client")?;
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Server running at http://localhost:{}", args.port);

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
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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

//! vsep-ui - interactive vocal/melody separation web form

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vsep_common::config::load_config;
use vsep_sep::{DemucsCli, FfmpegTrimmer, Separator};
use vsep_ui::config::ServerSettings;
use vsep_ui::fetch::YtDlpFetcher;
use vsep_ui::session::{SessionController, SessionStore};
use vsep_ui::{build_router, AppState};

/// Command-line arguments for vsep-ui
#[derive(Parser, Debug)]
#[command(name = "vsep-ui")]
#[command(about = "Web form for separating vocals and melody")]
#[command(version)]
struct Args {
    /// Address to bind (default from config: 127.0.0.1)
    #[arg(long, env = "VSEP_BIND")]
    bind: Option<String>,

    /// Port to listen on (default from config: 5790)
    #[arg(short, long, env = "VSEP_PORT")]
    port: Option<u16>,

    /// Config file (default: $VSEP_CONFIG, then ~/.config/vsep/vsep.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = load_config(args.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| loaded.config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting vsep-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    loaded.log_source();

    let config = loaded.config;
    let settings = ServerSettings::resolve(&config, args.bind.as_deref(), args.port)
        .context("Invalid server settings")?;

    let separator = Separator::new(Arc::new(DemucsCli::from_config(
        &config.tools,
        &config.model,
    )));
    info!(
        model = separator.model_name(),
        device = %config.model.device,
        "Separation model configured"
    );
    let controller = SessionController::new(
        separator,
        Arc::new(FfmpegTrimmer::from_config(&config.tools)),
        Arc::new(YtDlpFetcher::from_config(&config.tools)),
    );
    let state = AppState::new(
        SessionStore::new(settings.session_idle),
        controller,
        settings.max_upload_bytes,
    );
    let app = build_router(state);

    info!("Starting HTTP server on {}", settings.addr);
    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.addr))?;

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
                tracing::error!("Failed to install terminate handler: {}", e);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_overrides() {
        let args =
            Args::try_parse_from(["vsep-ui", "--bind", "0.0.0.0", "--port", "8080"]).unwrap();
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert!(args.config.is_none());
    }
}

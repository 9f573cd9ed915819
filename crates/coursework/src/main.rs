//! Coursework - assignment and submission API

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

mod config;
mod import;

use config::{Config, LogFormat, LoggingConfig};
use coursework_api::{AppState, create_router};
use coursework_core::SubmissionService;
use coursework_db::Database;
use coursework_notify::{HttpProbe, HttpProbeConfig, LogNotifier, Notifier, WebhookNotifier};

/// Coursework - assignment and submission API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "COURSEWORK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "COURSEWORK_PORT")]
    port: Option<u16>,

    /// CSV file of users to import at startup
    #[arg(long, env = "CSV_PATH")]
    users_csv: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging)?;

    info!("Starting Coursework v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database
    if let Some(parent) = Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database.url()).await?;

    // Import users
    if let Some(path) = args.users_csv.or(config.import.users_csv.clone()) {
        import::import_users(&db, Path::new(&path)).await?;
    }

    // Initialize submission probe and notifier
    let probe = Arc::new(HttpProbe::new(HttpProbeConfig {
        timeout: config.notify.probe_timeout(),
    })?);
    let notifier: Arc<dyn Notifier> = match &config.notify.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.notify.probe_timeout(),
        )?),
        None => {
            warn!("No webhook configured, submission notices will only be logged");
            Arc::new(LogNotifier)
        }
    };
    let submissions = SubmissionService::new(db.clone(), probe, notifier);

    // Install metrics recorder
    let metrics_handle = if config.metrics.enabled {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install metrics recorder")?,
        )
    } else {
        None
    };

    // Create application state
    let state = AppState::new(db, submissions);

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

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
fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .init(),
    }

    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

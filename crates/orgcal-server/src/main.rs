//! orgcal server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use orgcal_core::{TracingConfig, init_tracing};
use orgcal_engine::{SeriesResolver, TimelineEngine};
use orgcal_server::{AppState, NoopSync, SeedFile, ServerConfig, build_router};
use orgcal_store::{CalendarStore, MemoryStore};

/// orgcal-server - one merged calendar timeline per organization
#[derive(Debug, Parser)]
#[command(name = "orgcal-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "ORGCAL_BIND", default_value = "127.0.0.1:7410")]
    bind: SocketAddr,

    /// Path to a JSON seed file with calendar rows and token grants
    #[arg(long, env = "ORGCAL_SEED")]
    seed: Option<PathBuf>,

    /// Per-source fetch timeout in seconds
    #[arg(long, default_value = "10")]
    adapter_timeout: u64,

    /// Expand recurring class schedules in UTC instead of the server's
    /// local timezone
    #[arg(long)]
    utc: bool,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Enable debug output
    #[arg(long, short = 'v')]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.log_json {
        TracingConfig::server()
    } else if cli.debug {
        TracingConfig::dev()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let seed = match cli.seed {
        Some(ref path) => SeedFile::load(path)?,
        None => SeedFile::default(),
    };

    let config = ServerConfig::new(cli.bind)
        .with_cors(!cli.no_cors)
        .with_adapter_timeout(Duration::from_secs(cli.adapter_timeout));

    let store: Arc<dyn CalendarStore> = Arc::new(MemoryStore::from_snapshot(seed.store.clone()));
    let auth = Arc::new(seed.auth());

    let engine = if cli.utc {
        TimelineEngine::for_store(store.clone(), chrono::Utc)
    } else {
        TimelineEngine::for_store(store.clone(), chrono::Local)
    }
    .with_limits(config.limits)
    .with_adapter_timeout(config.adapter_timeout);

    let state = Arc::new(AppState::new(
        engine,
        SeriesResolver::new(store),
        auth,
        Arc::new(NoopSync),
    ));

    let router = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves when the process receives an interrupt.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            // Without a working handler, run until killed.
            tracing::error!(error = %err, "failed to install shutdown handler");
            std::future::pending::<()>().await;
        }
    }
}

//! Torneo - server and command line tools for the martial arts tournament site.
//!
//! `serve` runs the HTTP API used by the site; the other subcommands work
//! against the same spreadsheet scripts from a terminal.

mod commands;
mod handlers;
mod router;
mod state;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use torneo_core::api::SheetsClient;
use torneo_core::event::TournamentEvent;
use torneo_core::Config;

use state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Log level when RUST_LOG is unset, for the one-shot commands.
const CLI_LOG_LEVEL: &str = "warn";

/// Log level when RUST_LOG is unset, for `serve`.
const SERVER_LOG_LEVEL: &str = "info";

/// Prefix of the daily log files written under `log_dir`.
const LOG_FILE_PREFIX: &str = "torneo.log";

#[derive(Parser)]
#[command(name = "torneo", version, about = "Torneo Abierto de Artes Marciales")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind, overrides the configured one
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print age and category for a birth date (YYYY-MM-DD or DD/MM/YYYY)
    Classify { birth_date: String },
    /// Validate and submit a registration file
    Register {
        file: PathBuf,
        /// Print the rows instead of submitting them
        #[arg(long)]
        dry_run: bool,
        /// Also save the rows as CSV (a file, or a directory for the default name)
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Poll the competitor list and print each refresh
    Watch {
        /// Only show this category ("all" shows everyone)
        #[arg(long, default_value = "all")]
        category: String,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when `log_dir` is set, to a daily rolling file.
/// The returned guard must be held until exit so buffered lines get flushed.
fn init_tracing(default_level: &str, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

async fn serve(config: &Config, bind: Option<String>) -> Result<()> {
    let client = SheetsClient::from_config(config)?;
    let event = TournamentEvent::starting(&config.event_start)
        .with_context(|| format!("Invalid event_start: {}", config.event_start))?;
    let mode = client.mode();
    let app = router::app_router(AppState::new(client, event));

    let bind_addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, mode = ?mode, "Torneo API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::load()?;

    let default_level = match cli.command {
        Command::Serve { .. } => SERVER_LOG_LEVEL,
        _ => CLI_LOG_LEVEL,
    };
    let _guard = init_tracing(default_level, config.log_dir.as_deref());

    match cli.command {
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Classify { birth_date } => commands::classify_command(&birth_date),
        Command::Register { file, dry_run, csv } => {
            commands::register_command(&config, &file, dry_run, csv.as_deref()).await
        }
        Command::Watch { category } => commands::watch_command(&config, &category).await,
    }
}

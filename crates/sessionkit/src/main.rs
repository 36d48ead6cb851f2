//! sessionkit - demo server for request-scoped signed sessions
//!
//! Main entry point for the sessionkit CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod app;
mod commands;

use commands::{config, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// sessionkit - demo server for request-scoped signed sessions
#[derive(Parser)]
#[command(name = "sessionkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit console logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write JSON logs to a daily rotating file in this directory
    #[arg(long, global = true, env = "SESSIONKIT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the demo server
    Serve(serve::ServeArgs),

    /// Print the resolved configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

const VERBOSE_FILTER: &str =
    "sessionkit=debug,sessionkit_server=debug,sessionkit_store=debug,sessionkit_config=debug,tower_http=debug,info";
const DEFAULT_FILTER: &str = "sessionkit=info,sessionkit_server=info,sessionkit_store=info,warn";
const FILE_FILTER: &str =
    "sessionkit=trace,sessionkit_server=trace,sessionkit_store=trace,sessionkit_config=trace,info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let console_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(if cli.verbose {
                VERBOSE_FILTER
            } else {
                DEFAULT_FILTER
            })
        })
    };

    use tracing_subscriber::{Layer, prelude::*};
    let console = if cli.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_filter(console_filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(console_filter())
            .boxed()
    };

    // The guard flushes the file writer on drop, so it lives until main returns
    let (file, _guard) = match &cli.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "sessionkit.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();

    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}

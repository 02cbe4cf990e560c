//! CLI entry point for the csvdl downloader.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use csvdl_core::download::DEFAULT_CONNECT_TIMEOUT_SECS;
use csvdl_core::{DownloadEngine, HttpClient, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

mod cli;

use cli::Args;

// Downloads run strictly one at a time, so a single-threaded runtime is all
// the tool needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let table = Table::read(&args.input)
        .with_context(|| format!("failed to read input table {}", args.input.display()))?;
    info!(rows = table.len(), input = %args.input.display(), "loaded input table");

    let engine = DownloadEngine::new(
        table,
        &args.url_column,
        &args.name_column,
        &args.output_dir,
        args.attempt_cap(),
    )?;
    let client = HttpClient::with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, args.timeout);

    let spinner = (!args.quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(format!("Downloading {} files...", engine.len()));
        spinner
    });

    let stats = engine.run(&client).await?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    stats.print_summary();

    Ok(())
}

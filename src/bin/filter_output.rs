//! CLI entry point for the csvdl partition filter.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use csvdl_core::{OutputFilter, read_excluded_values};
use tracing::debug;

/// Filter the output.csv of a previous csvdl run.
///
/// Partitions the recorded rows into kept and excluded groups, rewrites
/// output-included.csv and output-excluded.csv, and moves the excluded
/// files into a separate directory, so a bad batch can be pruned without
/// re-downloading anything.
#[derive(Parser, Debug)]
#[command(name = "csvdl-filter")]
#[command(author, version, about)]
struct Args {
    /// Directory a previous run wrote into. Expected to contain output.csv.
    #[arg(long)]
    output_dir: PathBuf,

    /// Directory under which to move excluded files
    #[arg(long, default_value = "excluded")]
    excluded_dir: PathBuf,

    /// Column to look at when deciding what to exclude. Requires
    /// --excluded-values-file.
    #[arg(long, requires = "excluded_values_file")]
    filter_column: Option<String>,

    /// Line-separated file of values to exclude, looking at --filter-column
    #[arg(long, requires = "filter_column")]
    excluded_values_file: Option<PathBuf>,

    /// Max per input item count; rows whose filename suffix is greater
    /// than this are excluded (negative = disabled). E.g. with 10, an item
    /// named pizza_011.jpeg is excluded.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    max_count_per_base_name: i64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

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

    let mut filter_values = BTreeMap::new();
    if let (Some(column), Some(path)) = (&args.filter_column, &args.excluded_values_file) {
        let values = read_excluded_values(path)
            .with_context(|| format!("failed to read excluded values {}", path.display()))?;
        filter_values.insert(column.clone(), values);
    }

    let filter = OutputFilter::new(
        &args.output_dir,
        &args.excluded_dir,
        filter_values,
        u32::try_from(args.max_count_per_base_name).ok(),
    )?;
    let stats = filter.run()?;
    stats.print_summary();

    Ok(())
}

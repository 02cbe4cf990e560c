//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use csvdl_core::download::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Download the URLs listed in a CSV column.
///
/// csvdl reads a CSV with a header row, downloads the URL in one column
/// for every row, names each file from another column, and writes the
/// input rows plus the chosen filenames to output.csv in the output
/// directory.
#[derive(Parser, Debug)]
#[command(name = "csvdl")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the CSV file to be used
    #[arg(long)]
    pub input: PathBuf,

    /// Name of the column containing URLs to download
    #[arg(long)]
    pub url_column: String,

    /// Column that will be used to name the downloaded files
    #[arg(long)]
    pub name_column: String,

    /// Directory into which to store output. Will be created if needed.
    #[arg(long)]
    pub output_dir: PathBuf,

    /// If set, the maximum number of downloads to attempt (negative =
    /// unbounded). Useful for testing.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_downloads: i64,

    /// Per-request timeout in seconds, covering connect and body transfer
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// The attempt cap as the engine understands it: `None` when the flag
    /// is negative.
    #[must_use]
    pub fn attempt_cap(&self) -> Option<usize> {
        usize::try_from(self.max_downloads).ok()
    }
}

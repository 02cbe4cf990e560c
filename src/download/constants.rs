//! Constants for the download module (timeouts, output layout).

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default total per-request timeout (5 minutes for large files).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Name of the table a run writes into its output directory.
pub const OUTPUT_CSV_NAME: &str = "output.csv";

/// Synthetic column holding each row's assigned filename.
pub const OUTPUT_FILENAME_COLUMN: &str = "output_filename";

/// Maximum number of failed URLs echoed in the run summary.
pub const FAILED_SAMPLE_LIMIT: usize = 100;

//! Download engine: naming pass, sequential fetch loop, output table.
//!
//! The engine owns the table for the duration of one run. Construction
//! validates the schema, sorts the rows, and assigns every row its output
//! filename; [`DownloadEngine::run`] then walks the rows in order, fetching
//! at most one URL at a time, and persists the augmented table next to the
//! downloaded files.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use super::constants::{FAILED_SAMPLE_LIMIT, OUTPUT_CSV_NAME, OUTPUT_FILENAME_COLUMN};
use super::HttpClient;
use crate::naming::{UniqueNamer, extension_from_url};
use crate::table::{Table, TableError};

/// Error type for download engine operations.
///
/// These are precondition and persistence failures that abort the run;
/// per-item fetch failures are counted in [`DownloadStats`] instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The input table has no rows.
    #[error("input table has no rows")]
    EmptyTable,

    /// A required column is absent from the input table.
    #[error("required column {column:?} not found in input table")]
    MissingColumn {
        /// The column that was not found.
        column: String,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the output table failed.
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Statistics from one download run.
#[derive(Debug, Default)]
pub struct DownloadStats {
    /// Rows whose fetch completed and whose body was written to disk.
    pub succeeded: usize,
    /// Rows whose fetch failed (transport error or body write error).
    pub failed: usize,
    /// Rows skipped because their file already existed on disk.
    pub already_downloaded: usize,
    /// URLs of the failed rows, de-duplicated and sorted.
    pub failed_urls: BTreeSet<String>,
    /// Wall-clock duration of the fetch pass.
    pub elapsed: Duration,
}

impl DownloadStats {
    /// Prints the human-readable run summary to standard output.
    ///
    /// The failed-URL sample is sorted and capped at
    /// [`FAILED_SAMPLE_LIMIT`] entries.
    pub fn print_summary(&self) {
        println!(
            "Downloads took {:.2} minutes",
            self.elapsed.as_secs_f64() / 60.0
        );
        println!("Num successfully downloaded: {}", self.succeeded);
        println!("Num failed: {}", self.failed);
        println!("Num already downloaded: {}", self.already_downloaded);
        if !self.failed_urls.is_empty() {
            let sample: Vec<&str> = self
                .failed_urls
                .iter()
                .take(FAILED_SAMPLE_LIMIT)
                .map(String::as_str)
                .collect();
            println!("Failed downloads include: {}", sample.join(", "));
        }
    }
}

/// Sequential download engine driven by a table's URL and name columns.
///
/// # Execution Model
///
/// - Rows are stable-sorted by the name column at construction, so reruns
///   over unchanged input assign the same filenames in the same order.
/// - The naming pass runs at construction and touches every row, whether
///   or not its download is later attempted.
/// - The fetch pass issues one request at a time. A row whose file already
///   exists is skipped without a request and without consuming the attempt
///   cap; once the cap is reached the loop stops entirely.
#[derive(Debug)]
pub struct DownloadEngine {
    /// Sorted rows, already carrying the `output_filename` column.
    table: Table,
    url_index: usize,
    filename_index: usize,
    output_dir: PathBuf,
    max_downloads: Option<usize>,
}

impl DownloadEngine {
    /// Creates an engine for one run over `table`.
    ///
    /// Sorts the rows by `name_column` (stable, ties keep input order) and
    /// assigns every row a unique `output_filename` built from the
    /// normalized name key plus the extension sniffed from `url_column`.
    ///
    /// `max_downloads` caps the number of requests issued by
    /// [`DownloadEngine::run`]; `None` means unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyTable`] for a table with no rows and
    /// [`EngineError::MissingColumn`] when `url_column` or `name_column`
    /// is not in the header. Both are checked before any I/O side effect.
    pub fn new(
        mut table: Table,
        url_column: &str,
        name_column: &str,
        output_dir: impl Into<PathBuf>,
        max_downloads: Option<usize>,
    ) -> Result<Self, EngineError> {
        if table.is_empty() {
            return Err(EngineError::EmptyTable);
        }
        let url_index = table
            .column_index(url_column)
            .ok_or_else(|| EngineError::MissingColumn {
                column: url_column.to_string(),
            })?;
        let name_index = table
            .column_index(name_column)
            .ok_or_else(|| EngineError::MissingColumn {
                column: name_column.to_string(),
            })?;

        table.sort_by_column(name_index);

        // Naming pass: every row gets a proposed filename up front, so the
        // output table is complete even when downloading is capped or fails.
        let mut namer = UniqueNamer::new();
        let filenames: Vec<String> = table
            .rows()
            .iter()
            .map(|row| {
                let base = namer.next_base_name(row.get(name_index).unwrap_or(""));
                let extension = row
                    .get(url_index)
                    .and_then(extension_from_url)
                    .unwrap_or_default();
                format!("{base}{extension}")
            })
            .collect();
        let table = table.with_column(OUTPUT_FILENAME_COLUMN, filenames);
        let filename_index = table.columns().len() - 1;

        Ok(Self {
            table,
            url_index,
            filename_index,
            output_dir: output_dir.into(),
            max_downloads,
        })
    }

    /// Returns the sorted, filename-augmented table for this run.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the number of rows in this run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the run has no rows (never holds after
    /// construction succeeds).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Runs the fetch pass and persists the output table.
    ///
    /// Walks the rows in sorted order, skipping rows whose file already
    /// exists, stopping when the attempt cap is reached, and otherwise
    /// issuing exactly one request per row. Per-item failures are counted
    /// and logged, never abort the run. Finally writes the augmented table
    /// to `output_dir/output.csv` (full overwrite).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutputDir`] when the output directory cannot
    /// be created and [`EngineError::Table`] when the output table cannot
    /// be written.
    pub async fn run(&self, client: &HttpClient) -> Result<DownloadStats, EngineError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| EngineError::OutputDir {
                path: self.output_dir.clone(),
                source: e,
            })?;

        info!(
            rows = self.table.len(),
            output_dir = %self.output_dir.display(),
            max_downloads = ?self.max_downloads,
            "starting download run"
        );

        let mut stats = DownloadStats::default();
        let mut attempts = 0usize;
        let start = Instant::now();

        for row in self.table.rows() {
            let filename = row.get(self.filename_index).unwrap_or("");
            let output_path = self.output_dir.join(filename);
            if output_path.exists() {
                debug!(path = %output_path.display(), "already downloaded, skipping");
                stats.already_downloaded += 1;
                continue;
            }
            if self.max_downloads.is_some_and(|cap| attempts >= cap) {
                info!(attempts, "attempt cap reached, stopping");
                break;
            }
            attempts += 1;

            let url = row.get(self.url_index).unwrap_or("");
            match client.fetch_to_path(url, &output_path).await {
                Ok(bytes) => {
                    debug!(url = %url, bytes, path = %output_path.display(), "download completed");
                    stats.succeeded += 1;
                }
                Err(e) => {
                    error!(url = %url, error = %e, "download failed");
                    stats.failed += 1;
                    stats.failed_urls.insert(url.to_string());
                }
            }
        }
        stats.elapsed = start.elapsed();

        self.table.write(&self.output_dir.join(OUTPUT_CSV_NAME))?;

        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            already_downloaded = stats.already_downloaded,
            elapsed_secs = stats.elapsed.as_secs(),
            "download run complete"
        );
        Ok(stats)
    }
}

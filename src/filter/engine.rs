//! Partition engine: keep/drop decisions, table rewrite, file relocation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::FilterError;
use crate::download::{OUTPUT_CSV_NAME, OUTPUT_FILENAME_COLUMN};
use crate::table::{Row, Table};

/// Name of the kept-rows table, written into the source directory.
pub const INCLUDED_CSV_NAME: &str = "output-included.csv";

/// Name of the dropped-rows table, written into the excluded directory.
pub const EXCLUDED_CSV_NAME: &str = "output-excluded.csv";

/// Statistics from one partition run.
#[derive(Debug, Default)]
pub struct PartitionStats {
    /// Rows routed to the kept group.
    pub kept: usize,
    /// Rows routed to the excluded group.
    pub dropped: usize,
    /// Rows dropped because their filename suffix exceeded the threshold.
    pub dropped_count_too_high: usize,
    /// Rows dropped because a filter column held an excluded value.
    pub dropped_excluded_value: usize,
    /// Excluded files that were not found on disk during the move step.
    pub missing_moves: usize,
}

impl PartitionStats {
    /// Prints the human-readable partition summary to standard output.
    pub fn print_summary(&self) {
        println!("Num rows kept: {}", self.kept);
        println!("Num rows dropped: {}", self.dropped);
        println!("Num with count too high: {}", self.dropped_count_too_high);
        println!("Num with excluded value: {}", self.dropped_excluded_value);
        println!("Num to-move missing: {}", self.missing_moves);
    }
}

/// Partitions a download run's output into kept and excluded groups.
///
/// Rows are routed, never rewritten: both output tables carry the source
/// table's header and row content unchanged. Excluded files are moved, not
/// copied, so the source directory ends up holding only the kept files.
#[derive(Debug)]
pub struct OutputFilter {
    source_dir: PathBuf,
    excluded_dir: PathBuf,
    filter_values: BTreeMap<String, BTreeSet<String>>,
    max_count_per_base_name: Option<u32>,
}

impl OutputFilter {
    /// Creates a filter over the output of a prior download run.
    ///
    /// `filter_values` maps column names to the values that exclude a row;
    /// columns are checked in map order and the first match wins.
    /// `max_count_per_base_name` drops rows whose filename suffix exceeds
    /// it; `None` disables the threshold rule.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingOutputCsv`] when `source_dir` does not
    /// contain an `output.csv`, before any side effect.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        excluded_dir: impl Into<PathBuf>,
        filter_values: BTreeMap<String, BTreeSet<String>>,
        max_count_per_base_name: Option<u32>,
    ) -> Result<Self, FilterError> {
        let source_dir = source_dir.into();
        let source_csv = source_dir.join(OUTPUT_CSV_NAME);
        if !source_csv.exists() {
            return Err(FilterError::MissingOutputCsv { path: source_csv });
        }
        Ok(Self {
            source_dir,
            excluded_dir: excluded_dir.into(),
            filter_values,
            max_count_per_base_name,
        })
    }

    /// Runs the partition: decides keep/drop per row, rewrites the two
    /// tables, and moves the excluded files.
    ///
    /// An empty source table is a no-op: nothing is written and the stats
    /// come back all zero. A file missing during the move step is counted
    /// and skipped, never fatal.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingColumn`] when `output_filename` or a
    /// configured filter column is absent, [`FilterError::InvalidSuffix`]
    /// when the threshold is enabled and a filename has no parseable
    /// numeric suffix, and [`FilterError::Table`]/[`FilterError::Io`] for
    /// write and move failures.
    pub fn run(&self) -> Result<PartitionStats, FilterError> {
        let source_csv = self.source_dir.join(OUTPUT_CSV_NAME);
        let table = Table::read(&source_csv)?;

        let mut stats = PartitionStats::default();
        if table.is_empty() {
            info!(path = %source_csv.display(), "empty input, nothing to do");
            return Ok(stats);
        }

        let filename_index = table
            .column_index(OUTPUT_FILENAME_COLUMN)
            .ok_or_else(|| FilterError::MissingColumn {
                column: OUTPUT_FILENAME_COLUMN.to_string(),
            })?;
        let mut filter_indices = Vec::with_capacity(self.filter_values.len());
        for (column, values) in &self.filter_values {
            let index = table
                .column_index(column)
                .ok_or_else(|| FilterError::MissingColumn {
                    column: column.clone(),
                })?;
            filter_indices.push((index, values));
        }

        let mut kept: Vec<Row> = Vec::new();
        let mut dropped: Vec<Row> = Vec::new();
        let mut excluded_files: BTreeSet<String> = BTreeSet::new();
        for row in table.rows() {
            let filename = row.get(filename_index).unwrap_or("");
            let mut keep = true;
            if let Some(cap) = self.max_count_per_base_name {
                let suffix =
                    parse_name_suffix(filename).ok_or_else(|| FilterError::InvalidSuffix {
                        filename: filename.to_string(),
                    })?;
                if suffix > cap {
                    stats.dropped_count_too_high += 1;
                    keep = false;
                }
            }
            if keep {
                for (index, values) in &filter_indices {
                    if values.contains(row.get(*index).unwrap_or("")) {
                        stats.dropped_excluded_value += 1;
                        keep = false;
                        break;
                    }
                }
            }
            if keep {
                kept.push(row.clone());
            } else {
                debug!(filename = %filename, "dropping row");
                dropped.push(row.clone());
                excluded_files.insert(filename.to_string());
            }
        }
        stats.kept = kept.len();
        stats.dropped = dropped.len();

        let columns = table.columns().to_vec();
        Table::new(columns.clone(), kept).write(&self.source_dir.join(INCLUDED_CSV_NAME))?;

        std::fs::create_dir_all(&self.excluded_dir)
            .map_err(|e| FilterError::io(&self.excluded_dir, e))?;
        Table::new(columns, dropped).write(&self.excluded_dir.join(EXCLUDED_CSV_NAME))?;

        // File moves are keyed by distinct filename, not by row: the same
        // file may back several dropped rows.
        for filename in &excluded_files {
            let old_path = self.source_dir.join(filename);
            if !old_path.exists() {
                info!(path = %old_path.display(), "didn't find file to move");
                stats.missing_moves += 1;
                continue;
            }
            let new_path = self.excluded_dir.join(filename);
            info!(from = %old_path.display(), to = %new_path.display(), "moving excluded file");
            move_file(&old_path, &new_path).map_err(|e| FilterError::io(&old_path, e))?;
        }

        Ok(stats)
    }
}

/// Parses the numeric suffix from an output filename: the digits after the
/// final underscore of the extension-stripped base name.
///
/// `"tree_frog_004.jpg"` parses to `4`; returns `None` when there is no
/// underscore or the suffix is not an integer.
fn parse_name_suffix(filename: &str) -> Option<u32> {
    let base = match filename.rfind('.') {
        Some(index) if index > 0 => &filename[..index],
        _ => filename,
    };
    let (_, suffix) = base.rsplit_once('_')?;
    suffix.parse().ok()
}

/// Reads the line-delimited excluded-values file, right-trimming each line.
///
/// # Errors
///
/// Returns [`FilterError::Io`] when the file cannot be read.
pub fn read_excluded_values(path: &Path) -> Result<BTreeSet<String>, FilterError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FilterError::io(path, e))?;
    Ok(contents
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect())
}

/// Relocates a file, falling back to copy-and-remove when a plain rename
/// crosses file systems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}

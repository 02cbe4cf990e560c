//! Post-hoc partitioning of a download run's output.
//!
//! When downloaded files are large it is cheaper to work with the local
//! copies than to redo a run after discovering some rows should have been
//! excluded. This module reads a run's `output.csv`, splits its rows into
//! kept and excluded groups by a count threshold and per-column excluded
//! values, rewrites the two tables, and relocates the excluded files.

mod engine;
mod error;

pub use engine::{
    EXCLUDED_CSV_NAME, INCLUDED_CSV_NAME, OutputFilter, PartitionStats, read_excluded_values,
};
pub use error::FilterError;

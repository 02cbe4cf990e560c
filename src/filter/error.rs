//! Error types for the partition filter.

use std::path::PathBuf;

use thiserror::Error;

use crate::table::TableError;

/// Errors that can occur while partitioning a run's output.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The source directory does not contain an `output.csv`.
    #[error("missing output table {path}")]
    MissingOutputCsv {
        /// The expected table path.
        path: PathBuf,
    },

    /// A column the filter needs is absent from the output table.
    #[error("required column {column:?} not found in output table")]
    MissingColumn {
        /// The column that was not found.
        column: String,
    },

    /// A filename's numeric suffix could not be parsed while the count
    /// threshold was enabled.
    #[error("cannot parse numeric suffix from output filename {filename:?}")]
    InvalidSuffix {
        /// The offending filename.
        filename: String,
    },

    /// Reading or writing a table failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// File system error (creating the excluded directory, moving a file,
    /// or reading the excluded-values file).
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FilterError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

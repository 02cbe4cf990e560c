//! CSV table reading and writing.
//!
//! Tables are an ordered set of rows plus a header. Every row has exactly
//! one value per header column; the CSV reader rejects records with a
//! different field count, so the invariant holds for any table that loads
//! successfully.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading or writing a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Reading or parsing the CSV file failed.
    #[error("failed to read table {path}: {source}")]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Writing the CSV file failed.
    #[error("failed to write table {path}: {source}")]
    Write {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl TableError {
    fn read(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    fn write(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// One table row: a value per header column, in header order.
///
/// Rows are immutable value records. Operations that extend a row (such as
/// attaching an output filename) build a new row rather than mutating in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    /// Creates a row from its values.
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Returns the value at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns all values in header order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Returns a new row with `value` appended.
    #[must_use]
    fn with_value(&self, value: String) -> Self {
        let mut values = self.0.clone();
        values.push(value);
        Self(values)
    }
}

/// An ordered sequence of rows plus the header they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table from a header and rows.
    ///
    /// Callers are responsible for every row having one value per column;
    /// tables loaded through [`Table::read`] satisfy this by construction.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.values().len() == columns.len()));
        Self { columns, rows }
    }

    /// Reads a table from a CSV file with a header row.
    ///
    /// An input with a header but no data rows yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Read`] if the file cannot be opened, a record
    /// fails to parse, or a record's field count differs from the header's.
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::read(path, e))?;
        let columns = reader
            .headers()
            .map_err(|e| TableError::read(path, e))?
            .iter()
            .map(String::from)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| TableError::read(path, e))?;
            rows.push(Row(record.iter().map(String::from).collect()));
        }
        Ok(Self { columns, rows })
    }

    /// Writes the table to a CSV file, header first, overwriting any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Write`] if the file cannot be created or a
    /// record fails to serialize.
    pub fn write(&self, path: &Path) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| TableError::write(path, e))?;
        writer
            .write_record(&self.columns)
            .map_err(|e| TableError::write(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.values())
                .map_err(|e| TableError::write(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| TableError::write(path, csv::Error::from(e)))?;
        Ok(())
    }

    /// Returns the header columns in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the position of `name` in the header, or `None`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorts rows by the values in column `index`.
    ///
    /// The sort is stable: rows comparing equal keep their relative order.
    pub fn sort_by_column(&mut self, index: usize) {
        self.rows
            .sort_by(|a, b| a.get(index).unwrap_or("").cmp(b.get(index).unwrap_or("")));
    }

    /// Consumes the table and returns a new one with an extra column.
    ///
    /// `values` must hold one value per row, in row order.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.into());
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(row, value)| row.with_value(value))
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }
}

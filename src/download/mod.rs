//! Sequential HTTP fetch engine.
//!
//! This module downloads every URL in a table, one request at a time, to
//! filenames assigned up front by the naming pass. Downloads are strictly
//! sequential on purpose: firing many requests at once is a good way to get
//! blocked by the server on the other side.
//!
//! # Example
//!
//! ```no_run
//! use csvdl_core::download::{DownloadEngine, HttpClient};
//! use csvdl_core::table::Table;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = Table::read(Path::new("input.csv"))?;
//! let engine = DownloadEngine::new(table, "image_url", "species", "images", None)?;
//! let stats = engine.run(&HttpClient::new()).await?;
//! println!("Downloaded: {}, failed: {}", stats.succeeded, stats.failed);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;

pub use client::HttpClient;
pub use constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, FAILED_SAMPLE_LIMIT,
    OUTPUT_CSV_NAME, OUTPUT_FILENAME_COLUMN,
};
pub use engine::{DownloadEngine, DownloadStats, EngineError};
pub use error::FetchError;

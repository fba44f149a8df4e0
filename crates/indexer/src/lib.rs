//! # Indexer
//!
//! Orchestrates the three-phase project indexing pipeline: bind and
//! reconcile the project root against the catalog, traverse the filesystem
//! to diff it against what's already known, then run symbol extraction,
//! reference resolution and vector embedding in strict stage order with
//! bounded worker concurrency.

mod error;
mod options;
mod pipeline;
mod scanner;

pub use error::{IndexerError, Result};
pub use options::IndexingOptions;
pub use pipeline::{create_project, run, IndexingStatus};
pub use scanner::{FileScanner, ScannedEntry};

//! Export file pipeline for the location-history analyzer.
//!
//! Covers everything between the raw export drop directory and the in-memory
//! timeline collection the query engine works on:
//!
//! - scanning the import layer and collapsing duplicate export variants
//! - promoting files into the extracted layer (copy or gunzip)
//! - parsing extracted files into [`lh_core::Timeline`]s
//! - loading the place classification file

use std::path::PathBuf;

use thiserror::Error;

pub mod classify;
pub mod extract;
pub mod load;
pub mod scan;
pub mod store;

pub use classify::{ClassificationStatus, ClassificationStore};
pub use extract::{ExtractFailure, ExtractSummary, extract_import_layer};
pub use load::{LoadSummary, load_timelines};
pub use store::TimelineStore;

/// Failures in the file pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

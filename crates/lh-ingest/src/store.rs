//! In-memory holder for the loaded timeline collection.

use std::path::{Path, PathBuf};

use lh_core::Timeline;

use crate::IngestError;
use crate::load::{LoadSummary, load_timelines};

/// Owns the parsed timelines for the extracted layer.
///
/// `load` replaces the collection wholesale; callers take a fresh snapshot
/// through [`Self::timelines`] on every query and must not hold it across a
/// reload. Dropping the store (or calling [`Self::clear`]) releases the
/// parsed items, which dominate memory for multi-year exports.
#[derive(Debug, Default)]
pub struct TimelineStore {
    dir: PathBuf,
    timelines: Vec<Timeline>,
    summary: Option<LoadSummary>,
}

impl TimelineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timelines: Vec::new(),
            summary: None,
        }
    }

    /// Directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-scans and re-parses the extracted layer, replacing the previous
    /// collection in one step.
    pub fn load(&mut self) -> Result<&LoadSummary, IngestError> {
        let (timelines, summary) = load_timelines(&self.dir)?;
        self.timelines = timelines;
        Ok(self.summary.insert(summary))
    }

    /// Read-only snapshot of the loaded timelines.
    pub fn timelines(&self) -> &[Timeline] {
        &self.timelines
    }

    /// Summary of the most recent load, if any.
    pub fn summary(&self) -> Option<&LoadSummary> {
        self.summary.as_ref()
    }

    /// Drops all loaded data.
    pub fn clear(&mut self) {
        self.timelines = Vec::new();
        self.summary = None;
    }
}

//! Parsing the extracted layer into timelines.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use lh_core::Timeline;
use serde::Serialize;

use crate::IngestError;
use crate::scan::scan_extracted_files;

/// Outcome of one load of the extracted layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    /// Extracted-layer files seen.
    pub files_seen: usize,
    /// Files that parsed into a timeline.
    pub timelines_parsed: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Reads and parses every extracted file in `dir`, in filename order
/// (chronological for the `YYYY-MM-DD.json` naming scheme).
///
/// Empty and unparsable files are skipped with a warning; the raw file
/// content is dropped as soon as each timeline is parsed, since multi-year
/// exports run to many megabytes per day.
pub fn load_timelines(dir: &Path) -> Result<(Vec<Timeline>, LoadSummary), IngestError> {
    let files = scan_extracted_files(dir)?;
    let mut timelines = Vec::with_capacity(files.len());

    for path in &files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "skipping unreadable file");
                continue;
            }
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "skipping empty export file");
            continue;
        }
        match serde_json::from_str::<Timeline>(&content) {
            Ok(timeline) => timelines.push(timeline),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "skipping invalid export file");
            }
        }
    }

    let summary = LoadSummary {
        files_seen: files.len(),
        timelines_parsed: timelines.len(),
        loaded_at: Utc::now(),
    };
    tracing::info!(
        files = summary.files_seen,
        timelines = summary.timelines_parsed,
        "extracted layer loaded"
    );
    Ok((timelines, summary))
}

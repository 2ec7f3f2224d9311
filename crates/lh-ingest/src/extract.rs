//! Import-layer to extracted-layer promotion.
//!
//! Each deduplicated source file is skipped (target already up to date),
//! copied (`.json`) or gunzip-extracted (`.json.gz`) into the extracted
//! layer under its clean `<timespan>.json` name. Per-file failures are
//! collected into the summary and never abort the batch.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use serde::Serialize;

use crate::scan::{clean_file_name, deduplicate_by_timespan, scan_import_files};
use crate::IngestError;

/// How a single source file was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Skip,
    Copy,
    Extract,
}

/// A source file that could not be promoted.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one extraction run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSummary {
    /// Import-layer files found, duplicate variants included.
    pub source_files: usize,
    /// Files remaining after timespan deduplication.
    pub without_duplicates: usize,
    pub skipped: usize,
    pub copied: usize,
    pub extracted: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExtractFailure>,
    pub extracted_at: DateTime<Utc>,
}

/// Promotes the import layer into the extracted layer.
///
/// Scans `import_dir`, deduplicates by timespan and processes each survivor
/// against `extract_dir` (created if absent).
pub fn extract_import_layer(
    import_dir: &Path,
    extract_dir: &Path,
) -> Result<ExtractSummary, IngestError> {
    let source_files = scan_import_files(import_dir)?;
    let deduplicated = deduplicate_by_timespan(source_files.clone());
    fs::create_dir_all(extract_dir)?;

    let mut summary = ExtractSummary {
        source_files: source_files.len(),
        without_duplicates: deduplicated.len(),
        skipped: 0,
        copied: 0,
        extracted: 0,
        failures: Vec::new(),
        extracted_at: Utc::now(),
    };

    for source in &deduplicated {
        let target = extract_dir.join(format!("{}.json", clean_file_name(source)));
        match promote_file(source, &target) {
            Ok(Method::Skip) => summary.skipped += 1,
            Ok(Method::Copy) => summary.copied += 1,
            Ok(Method::Extract) => summary.extracted += 1,
            Err(error) => {
                tracing::warn!(
                    source = %source.display(),
                    error = %error,
                    "failed to promote export file"
                );
                summary.failures.push(ExtractFailure {
                    path: source.clone(),
                    error: error.to_string(),
                });
            }
        }
    }

    tracing::info!(
        copied = summary.copied,
        extracted = summary.extracted,
        skipped = summary.skipped,
        failures = summary.failures.len(),
        "extraction run finished"
    );
    Ok(summary)
}

fn promote_file(source: &Path, target: &Path) -> Result<Method, IngestError> {
    if target_is_newer(source, target) {
        return Ok(Method::Skip);
    }
    let is_gzip = source
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"));
    if is_gzip {
        let mut decoder = GzDecoder::new(File::open(source)?);
        let mut output = File::create(target)?;
        io::copy(&mut decoder, &mut output)?;
        Ok(Method::Extract)
    } else {
        fs::copy(source, target)?;
        Ok(Method::Copy)
    }
}

/// True when the target exists and is at least as recent as the source.
/// A missing target (or unreadable mtime) means the file must be promoted.
fn target_is_newer(source: &Path, target: &Path) -> bool {
    let mtime = |path: &Path| fs::metadata(path).and_then(|meta| meta.modified()).ok();
    match (mtime(source), mtime(target)) {
        (Some(source_time), Some(target_time)) => target_time >= source_time,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_gzip(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn copies_plain_json_and_extracts_gzip() {
        let temp = TempDir::new().unwrap();
        let import = temp.path().join("import");
        let extract = temp.path().join("extracted");
        fs::create_dir_all(&import).unwrap();

        fs::write(import.join("2019-02-22.json"), r#"{"timelineItems":[]}"#).unwrap();
        write_gzip(
            &import.join("2019-02-23.json.gz"),
            r#"{"timelineItems":[]}"#,
        );

        let summary = extract_import_layer(&import, &extract).unwrap();
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.extracted, 1);
        assert_eq!(summary.skipped, 0);
        assert!(summary.failures.is_empty());

        let extracted = fs::read_to_string(extract.join("2019-02-23.json")).unwrap();
        assert_eq!(extracted, r#"{"timelineItems":[]}"#);
    }

    #[test]
    fn second_run_skips_up_to_date_targets() {
        let temp = TempDir::new().unwrap();
        let import = temp.path().join("import");
        let extract = temp.path().join("extracted");
        fs::create_dir_all(&import).unwrap();
        fs::write(import.join("2019-02-22.json"), "{}").unwrap();

        extract_import_layer(&import, &extract).unwrap();
        let summary = extract_import_layer(&import, &extract).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.copied, 0);
    }

    #[test]
    fn duplicate_variants_produce_one_target() {
        let temp = TempDir::new().unwrap();
        let import = temp.path().join("import");
        let extract = temp.path().join("extracted");
        fs::create_dir_all(&import).unwrap();
        fs::write(import.join("2019-02-22.json"), "{}").unwrap();
        write_gzip(&import.join("2019-02-22 1915.json.gz"), "{}");

        let summary = extract_import_layer(&import, &extract).unwrap();
        assert_eq!(summary.source_files, 2);
        assert_eq!(summary.without_duplicates, 1);
        assert!(extract.join("2019-02-22.json").exists());
    }

    #[test]
    fn corrupt_gzip_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let import = temp.path().join("import");
        let extract = temp.path().join("extracted");
        fs::create_dir_all(&import).unwrap();
        fs::write(import.join("2019-02-22.json.gz"), b"not actually gzip").unwrap();
        fs::write(import.join("2019-02-23.json"), "{}").unwrap();

        let summary = extract_import_layer(&import, &extract).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.copied, 1);
        assert!(summary.failures[0].path.ends_with("2019-02-22.json.gz"));
    }
}

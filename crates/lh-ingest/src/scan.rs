//! Export directory scanning and filename normalization.
//!
//! The import layer receives daily export files under names like
//! `2019-02-22.json.gz`, `2019-02-22 1915.json.gz` or `2019-02-22.json(12).gz`
//! (cloud-drive duplicate suffixes). Scanning walks the directory tree,
//! keeps only filenames matching the export pattern and collapses duplicate
//! variants of the same timespan down to the most recently modified file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;

use crate::IngestError;

/// Filenames accepted in the import layer (daily or monthly exports, with
/// optional duplicate markers, gzipped or not).
static IMPORT_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}(-[0-9]{2})?( [0-9]+)?\.json(\([0-9]+\))?(\.gz)?$").unwrap()
});

/// Filenames accepted in the extracted layer.
static EXTRACTED_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}(-[0-9]{2})?\.json$").unwrap());

/// Trailing duplicate markers and extensions stripped by [`clean_file_name`].
static FILE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"( [0-9]+)?\.json(\([0-9]+\))?(\.gz)?$").unwrap());

/// Recursively collects all file paths under `dir`.
pub fn traverse_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(traverse_dir(&path)?);
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

fn matching_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(IngestError::MissingDirectory(dir.to_path_buf()));
    }
    let mut files: Vec<PathBuf> = traverse_dir(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.is_match(name))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// All import-layer export files under `dir`, duplicates included.
pub fn scan_import_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    matching_files(dir, &IMPORT_FILE_RE)
}

/// All extracted-layer files under `dir`, sorted by name (chronological by
/// construction of the `YYYY-MM-DD.json` naming scheme).
pub fn scan_extracted_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    matching_files(dir, &EXTRACTED_FILE_RE)
}

/// Reduces a filename to its timespan, e.g.:
/// `2015-08-02.json.gz`      => `2015-08-02`
/// `2019-02-22 1915.json.gz` => `2019-02-22`
/// `2019-02-22.json(12).gz`  => `2019-02-22`
pub fn clean_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    FILE_SUFFIX_RE.replace(name, "").into_owned()
}

/// Keeps one file per timespan: the variant with the newest mtime.
/// Output preserves the sorted order of the surviving files.
pub fn deduplicate_by_timespan(files: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut newest: Vec<(String, PathBuf, SystemTime)> = Vec::new();
    for path in files {
        let clean = clean_file_name(&path);
        let modified = file_mtime(&path);
        match newest.iter_mut().find(|(existing, _, _)| *existing == clean) {
            Some(entry) if modified > entry.2 => {
                entry.1 = path;
                entry.2 = modified;
            }
            Some(_) => {}
            None => newest.push((clean, path, modified)),
        }
    }
    let mut survivors: Vec<PathBuf> = newest.into_iter().map(|(_, path, _)| path).collect();
    survivors.sort();
    survivors
}

fn file_mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

//! Classification file loading.
//!
//! Classifications live in a JSON object mapping a category name to the
//! place names it contains (`{"home": ["Home", "Old Home"], ...}`). A
//! locally modified sibling file with a `.mine` infix is preferred over the
//! checked-in default, so personal place names stay out of version control.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lh_core::PlaceResolver;
use serde::Serialize;

use crate::IngestError;

/// Load state reported by the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStatus {
    pub loaded_at: Option<DateTime<Utc>>,
    pub categories: usize,
}

/// Cached category → place-names lookup backed by a JSON file.
#[derive(Debug, Clone)]
pub struct ClassificationStore {
    path: PathBuf,
    classifications: HashMap<String, Vec<String>>,
    loaded_at: Option<DateTime<Utc>>,
}

impl ClassificationStore {
    /// Creates an empty store reading from `path` (or its `.mine` sibling).
    /// Nothing is read until [`Self::ensure_loaded`] or [`Self::reload`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            classifications: HashMap::new(),
            loaded_at: None,
        }
    }

    /// The file that would be read right now: the `.mine` sibling when it
    /// exists, the configured path otherwise.
    pub fn effective_path(&self) -> PathBuf {
        let mine = self.mine_path();
        if mine.exists() { mine } else { self.path.clone() }
    }

    fn mine_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        self.path.with_file_name(format!("{stem}.mine.json"))
    }

    /// Loads the classification file if it has not been loaded yet.
    pub fn ensure_loaded(&mut self) -> Result<(), IngestError> {
        if self.loaded_at.is_none() {
            self.reload()?;
        }
        Ok(())
    }

    /// Re-reads the classification file, replacing the cached map.
    pub fn reload(&mut self) -> Result<(), IngestError> {
        let path = self.effective_path();
        tracing::debug!(path = %path.display(), "loading classification file");
        let content = fs::read_to_string(&path)?;
        self.classifications = serde_json::from_str(&content)?;
        self.loaded_at = Some(Utc::now());
        tracing::info!(
            path = %path.display(),
            categories = self.classifications.len(),
            "classifications loaded"
        );
        Ok(())
    }

    pub fn status(&self) -> ClassificationStatus {
        ClassificationStatus {
            loaded_at: self.loaded_at,
            categories: self.classifications.len(),
        }
    }
}

impl PlaceResolver for ClassificationStore {
    /// Resolves from the cached map; unknown categories (and a store that
    /// was never loaded) resolve to nothing.
    fn resolve(&self, category: &str) -> Vec<String> {
        self.classifications.resolve(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn base_file(dir: &Path) -> PathBuf {
        dir.join("classifications.json")
    }

    #[test]
    fn resolves_categories_after_load() {
        let temp = TempDir::new().unwrap();
        let path = base_file(temp.path());
        fs::write(&path, r#"{"home": ["Home"], "work": ["Office", "Lab"]}"#).unwrap();

        let mut store = ClassificationStore::new(&path);
        store.ensure_loaded().unwrap();
        assert_eq!(store.resolve("work"), ["Office", "Lab"]);
        assert!(store.resolve("gym").is_empty());
        assert_eq!(store.status().categories, 2);
    }

    #[test]
    fn prefers_locally_modified_file() {
        let temp = TempDir::new().unwrap();
        let path = base_file(temp.path());
        fs::write(&path, r#"{"home": ["Wrong"]}"#).unwrap();
        fs::write(
            temp.path().join("classifications.mine.json"),
            r#"{"home": ["Mine"]}"#,
        )
        .unwrap();

        let mut store = ClassificationStore::new(&path);
        store.ensure_loaded().unwrap();
        assert_eq!(store.resolve("home"), ["Mine"]);
    }

    #[test]
    fn unloaded_store_resolves_to_nothing() {
        let store = ClassificationStore::new("/nonexistent/classifications.json");
        assert!(store.resolve("home").is_empty());
        assert!(store.status().loaded_at.is_none());
    }

    #[test]
    fn ensure_loaded_is_lazy_and_cached() {
        let temp = TempDir::new().unwrap();
        let path = base_file(temp.path());
        fs::write(&path, r#"{"home": ["Home"]}"#).unwrap();

        let mut store = ClassificationStore::new(&path);
        store.ensure_loaded().unwrap();
        let first = store.status().loaded_at;

        // A second ensure_loaded must not re-read the file
        fs::write(&path, r#"{"home": ["Changed"]}"#).unwrap();
        store.ensure_loaded().unwrap();
        assert_eq!(store.status().loaded_at, first);
        assert_eq!(store.resolve("home"), ["Home"]);

        // An explicit reload does
        store.reload().unwrap();
        assert_eq!(store.resolve("home"), ["Changed"]);
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let mut store = ClassificationStore::new("/nonexistent/classifications.json");
        assert!(store.ensure_loaded().is_err());
    }
}

//! Shared application state.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use lh_ingest::{ClassificationStore, TimelineStore};

/// Process-wide state behind the router.
///
/// Queries take read locks and a fresh timeline snapshot per call; the
/// reload endpoints are the only writers and serialize on the write lock,
/// so no query ever observes a half-replaced collection.
#[derive(Debug)]
pub struct AppState {
    pub store: RwLock<TimelineStore>,
    pub classification: RwLock<ClassificationStore>,
    /// Import-layer directory used by the extract endpoint.
    pub import_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        import_dir: impl Into<PathBuf>,
        extract_dir: impl Into<PathBuf>,
        classification_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store: RwLock::new(TimelineStore::new(extract_dir.into())),
            classification: RwLock::new(ClassificationStore::new(classification_path.into())),
            import_dir: import_dir.into(),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

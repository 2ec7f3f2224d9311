//! Classification lookup seam.
//!
//! A classification maps a category name (e.g. "home", "work") to the place
//! names belonging to it. The filter builder resolves `placeClass` inputs
//! through this trait so the engine stays free of file I/O; the loader lives
//! in the ingest crate.

use std::collections::HashMap;

/// Resolves a category name to the place names it contains.
pub trait PlaceResolver {
    /// Returns the place names in `category`, empty if unknown.
    fn resolve(&self, category: &str) -> Vec<String>;
}

/// Resolver with no classifications loaded. Every lookup is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassification;

impl PlaceResolver for NoClassification {
    fn resolve(&self, _category: &str) -> Vec<String> {
        Vec::new()
    }
}

impl PlaceResolver for HashMap<String, Vec<String>> {
    fn resolve(&self, category: &str) -> Vec<String> {
        self.get(category).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_resolver_returns_members() {
        let mut map = HashMap::new();
        map.insert("home".to_string(), vec!["Home".to_string()]);
        assert_eq!(map.resolve("home"), ["Home"]);
        assert!(map.resolve("work").is_empty());
    }

    #[test]
    fn no_classification_is_always_empty() {
        assert!(NoClassification.resolve("home").is_empty());
    }
}

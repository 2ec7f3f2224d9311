//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory raw export files are dropped into (e.g. a cloud drive).
    pub import_dir: PathBuf,
    /// Directory holding the extracted `YYYY-MM-DD.json` files.
    pub extract_dir: PathBuf,
    /// Place classification file; a `.mine` sibling takes precedence.
    pub classification_path: PathBuf,
    /// Load the extracted layer when the server starts.
    pub auto_load_on_start: bool,
    /// Listen address for `lh serve`.
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            import_dir: data_dir.join("import"),
            extract_dir: data_dir.join("extracted"),
            classification_path: config_dir.join("classifications.json"),
            auto_load_on_start: false,
            listen: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (LH_*)
        figment = figment.merge(Env::prefixed("LH_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for lh.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lh"))
}

/// Returns the platform-specific data directory for lh.
///
/// On Linux: `~/.local/share/lh`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("lh"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_lh() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "lh");
    }

    #[test]
    fn test_default_config_nests_under_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.import_dir, data_dir.join("import"));
        assert_eq!(config.extract_dir, data_dir.join("extracted"));
        assert!(!config.auto_load_on_start);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_file = temp.path().join("config.toml");
        std::fs::write(
            &config_file,
            r#"
import_dir = "/data/import"
listen = "0.0.0.0:8080"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&config_file)).unwrap();
        assert_eq!(config.import_dir, PathBuf::from("/data/import"));
        assert_eq!(config.listen, "0.0.0.0:8080");
        // Untouched keys keep their defaults
        assert!(!config.auto_load_on_start);
    }
}

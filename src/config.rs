//! Configuration file parser for `rsswrite.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::WriterOptions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Output settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spaces per nesting level. 0 = single-line output.
    pub indent: usize,

    /// Whether to write the `<?xml ...?>` declaration.
    pub xml_declaration: bool,

    /// Write the document here instead of standard output.
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let options = WriterOptions::default();
        Self {
            indent: options.indent,
            xml_declaration: options.xml_declaration,
            output: None,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = ["indent", "xml_declaration", "output"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), indent = config.indent, "Loaded configuration");
        Ok(config)
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            indent: self.indent,
            xml_declaration: self.xml_declaration,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.indent, 2);
        assert!(config.xml_declaration);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/rsswrite_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "   \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "indent = 4\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.indent, 4);
        assert!(config.xml_declaration); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");

        let content = r#"
indent = 0
xml_declaration = false
output = "/tmp/feed.xml"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.indent, 0);
        assert!(!config.xml_declaration);
        assert_eq!(config.output, Some(PathBuf::from("/tmp/feed.xml")));
        assert_eq!(
            config.writer_options(),
            WriterOptions {
                indent: 0,
                xml_declaration: false
            }
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "indent = 3\nindnet = 8\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.indent, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "indent = \"two\"\n").unwrap();

        assert!(Config::load(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("rsswrite_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rsswrite.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}

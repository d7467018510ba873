//! pkcase Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! defaults matching the built-in unit tables and PubMed links.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Extensions to the unit normalization tables
    pub units: UnitsConfig,

    /// Database record assembly
    pub records: RecordsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        // Records
        if let Ok(base) = std::env::var("PKCASE_ARTICLE_URL_BASE") {
            config.records.article_url_base = base.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    /// Parse TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;

        // Only override if env values differ from defaults
        if env_config.logging.level != LoggingConfig::default().level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format {
            self.logging.json_format = true;
        }
        if env_config.records.article_url_base != RecordsConfig::default().article_url_base {
            self.records.article_url_base = env_config.records.article_url_base;
        }

        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Additional entries for the unit normalization tables
///
/// The built-in tables are always loaded; these only add to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Canonical unit -> additional synonyms
    pub extra_synonyms: BTreeMap<String, Vec<String>>,

    /// Magnitude name (TIME, MASS, ...) -> additional atomic units
    pub extra_magnitudes: BTreeMap<String, Vec<String>>,
}

impl UnitsConfig {
    pub fn is_empty(&self) -> bool {
        self.extra_synonyms.is_empty() && self.extra_magnitudes.is_empty()
    }
}

/// Database record assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Base URL for article links (no trailing slash)
    pub article_url_base: String,

    /// Drop repeated identical estimates within a sentence
    pub deduplicate_estimates: bool,

    /// Number of parameter types reported in statistics
    pub top_types: usize,

    /// Number of unit strings reported in statistics
    pub top_units: usize,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            article_url_base: "https://pubmed.ncbi.nlm.nih.gov".to_string(),
            deduplicate_estimates: true,
            top_types: 20,
            top_units: 10,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.records.top_types, 20);
        assert!(config.records.deduplicate_estimates);
        assert!(config.units.is_empty());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [records]
            top_units = 5

            [units.extra_synonyms]
            "μg" = ["mcg"]

            [units.extra_magnitudes]
            TIME = ["wk"]
            "#,
        )
        .unwrap();

        assert_eq!(config.records.top_units, 5);
        assert_eq!(config.records.top_types, 20);
        assert_eq!(config.units.extra_synonyms["μg"], vec!["mcg"]);
        assert_eq!(config.units.extra_magnitudes["TIME"], vec!["wk"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml_str("[records]\ntop_units = \"many\"").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("LOG_JSON", "true").unwrap());
        assert!(!parse_bool("LOG_JSON", "0").unwrap());
        assert!(parse_bool("LOG_JSON", "maybe").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/pkcase.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}

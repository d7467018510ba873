//! pkcase Core - Shared records, error types and configuration
//!
//! This crate defines the plain structured records exchanged between the
//! extraction pipeline and its collaborators (annotation tools, inference
//! services, batch loaders, presentation layers):
//! - Span and relation records produced by NER/RE models
//! - Flat estimate and database records consumed by tables and exports
//! - Common error types
//! - Configuration management

pub mod config;
pub mod records;

pub use config::{AppConfig, ConfigError, LoggingConfig, RecordsConfig, UnitsConfig};
pub use records::{DatabaseRecord, EstimateRecord, RelationRecord, SentenceRecord, SpanRecord};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for pkcase operations
#[derive(Error, Debug)]
pub enum PkError {
    #[error("Invalid span [{start}, {end}) for text of {len} characters")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for PkError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PkError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PkError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_span_message() {
        let err = PkError::InvalidSpan {
            start: 4,
            end: 2,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "Invalid span [4, 2) for text of 10 characters"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: PkError = ConfigError::InvalidValue {
            key: "LOG_JSON".to_string(),
            value: "maybe".to_string(),
        }
        .into();
        assert!(matches!(err, PkError::Config(_)));
        assert!(err.to_string().contains("LOG_JSON"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<SentenceRecord>("{not json");
        let err: PkError = parse.unwrap_err().into();
        assert!(matches!(err, PkError::InvalidRecord(_)));
    }
}

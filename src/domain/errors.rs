//! Domain error types
//!
//! This module defines the error hierarchy for PhiGuard. Every fatal
//! condition surfaced to a caller maps to exactly one [`PhiError`] variant,
//! and every variant carries a stable [`kind`](PhiError::kind) tag that the
//! request boundary reports alongside the message.
//!
//! Per-item failures (one detection rule, one recognition chunk, one page of
//! extraction) are logged and skipped where they happen; they only become a
//! [`PhiError`] when the failure is structural.

use thiserror::Error;

/// Main PhiGuard error type
#[derive(Debug, Error)]
pub enum PhiError {
    /// A document (or a required part of it) could not be parsed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A detection rule or recognition chunk failed
    #[error("Scan failure: {0}")]
    ScanFailure(String),

    /// The handling policy is not one of redact, tokenize, remove
    #[error("Unsupported handling policy '{0}'. Must be one of: redact, tokenize, remove")]
    UnsupportedPolicy(String),

    /// The redacted rendition of a paginated document could not be built
    #[error("Redaction failure: {0}")]
    RedactionFailure(String),

    /// The entity-recognition capability could not be initialized
    #[error("Entity recognizer unavailable: {0}")]
    ModelUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid detection pattern or pattern library
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PhiError {
    /// Stable machine-readable tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extraction_error",
            Self::ScanFailure(_) => "scan_failure",
            Self::UnsupportedPolicy(_) => "unsupported_policy",
            Self::RedactionFailure(_) => "redaction_failure",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Configuration(_) => "configuration_error",
            Self::Pattern(_) => "pattern_error",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    /// HTTP-style status code reported by the request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedPolicy(_) => 400,
            Self::Extraction(_) => 415,
            Self::ModelUnavailable(_) => 503,
            _ => 500,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PhiError {
    fn from(err: std::io::Error) -> Self {
        PhiError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PhiError {
    fn from(err: serde_json::Error) -> Self {
        PhiError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PhiError {
    fn from(err: toml::de::Error) -> Self {
        PhiError::Configuration(format!("TOML parse error: {err}"))
    }
}

// lopdf failures only occur while building the redacted rendition
impl From<lopdf::Error> for PhiError {
    fn from(err: lopdf::Error) -> Self {
        PhiError::RedactionFailure(err.to_string())
    }
}

impl From<regex::Error> for PhiError {
    fn from(err: regex::Error) -> Self {
        PhiError::Pattern(err.to_string())
    }
}

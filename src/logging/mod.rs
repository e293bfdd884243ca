//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Human-readable console output on stderr
//! - Optional JSON file output with daily or hourly rotation
//! - Level from configuration, overridable with `RUST_LOG`
//!
//! Log events carry counts, categories, timings and request ids. Document
//! text and detected values are never logged.

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a failed request with its error kind
///
/// The document name is logged as a digest.
///
/// # Example
///
/// ```no_run
/// use phiguard::log_request_failure;
/// use phiguard::domain::PhiError;
///
/// let error = PhiError::Extraction("Failed to parse PDF".to_string());
/// log_request_failure!(&error, "scan.pdf");
/// ```
#[macro_export]
macro_rules! log_request_failure {
    ($error:expr, $document:expr) => {
        tracing::error!(
            kind = $error.kind(),
            status = $error.status_code(),
            error = %$error,
            document_hash = %$crate::phi::audit::hash_value($document),
            "Request failed"
        );
    };
}

//! Configuration management for PhiGuard.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! PhiGuard uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PHIGUARD_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting (an empty file is valid)
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use phiguard::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phiguard.toml")?;
//!
//! println!("Default policy: {}", config.redaction.policy);
//! println!("Chunk size: {}", config.scanner.chunk_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ScannerConfig`] - Pattern library, chunking and context triggers
//! - [`RecognizerConfig`] - Entity recognizer backend
//! - [`RedactionConfig`] - Policy, marker, token and box settings
//! - [`AuditConfig`] - Audit log
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [scanner]
//! chunk_size = 100000
//!
//! [recognizer]
//! backend = "command"
//! command = ["${PHIGUARD_NER_PYTHON}", "ner.py"]
//!
//! [redaction]
//! policy = "redact"
//! marker = "[REDACTED]"
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/phiguard.log"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, AuditConfig, LoggingConfig, PhiGuardConfig, RecognizerBackend,
    RecognizerConfig, RedactionConfig, ScannerConfig,
};

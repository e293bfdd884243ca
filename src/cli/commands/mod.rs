//! CLI command implementations
//!
//! Exit codes: 0 success, 2 configuration error, 3 processing error,
//! 5 fatal error.

pub mod init;
pub mod process;
pub mod scan;
pub mod validate;

use crate::cli::DEFAULT_CONFIG_PATH;
use crate::config::{load_config, load_config_from_str, PhiGuardConfig};
use crate::domain::Result;
use std::path::Path;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_PROCESSING_ERROR: i32 = 3;
pub const EXIT_FATAL: i32 = 5;

/// Load the configuration for a processing command
///
/// A missing file at the default location falls back to built-in defaults
/// (environment overrides still apply). An explicitly named file must exist.
pub(crate) fn load_or_default(config_path: &str) -> Result<PhiGuardConfig> {
    if config_path == DEFAULT_CONFIG_PATH && !Path::new(config_path).exists() {
        tracing::debug!("No configuration file found; using defaults");
        return load_config_from_str("");
    }
    load_config(config_path)
}

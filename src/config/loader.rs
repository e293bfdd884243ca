//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{PhiGuardConfig, RecognizerBackend};
use crate::domain::errors::PhiError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PhiGuardConfig
/// 4. Applies environment variable overrides (PHIGUARD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PhiError::Configuration`] if the file cannot be read, a
/// referenced variable is unset, the TOML does not parse, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use phiguard::config::loader::load_config;
///
/// let config = load_config("phiguard.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PhiGuardConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PhiError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PhiError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text, with the same steps as [`load_config`]
pub fn load_config_from_str(contents: &str) -> Result<PhiGuardConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PhiGuardConfig = toml::from_str(&contents)
        .map_err(|e| PhiError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PhiError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PhiError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using PHIGUARD_* prefix
///
/// Environment variables follow the pattern: PHIGUARD_<SECTION>_<KEY>
/// For example: PHIGUARD_REDACTION_POLICY, PHIGUARD_RECOGNIZER_BACKEND
fn apply_env_overrides(config: &mut PhiGuardConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PHIGUARD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Scanner overrides
    if let Ok(val) = std::env::var("PHIGUARD_SCANNER_PATTERN_LIBRARY") {
        config.scanner.pattern_library = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("PHIGUARD_SCANNER_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.scanner.chunk_size = size;
        }
    }
    if let Ok(val) = std::env::var("PHIGUARD_SCANNER_NAME_CONTEXT_WINDOW") {
        if let Ok(window) = val.parse() {
            config.scanner.name_context_window = window;
        }
    }

    // Recognizer overrides
    if let Ok(val) = std::env::var("PHIGUARD_RECOGNIZER_BACKEND") {
        config.recognizer.backend = match val.to_lowercase().as_str() {
            "heuristic" => RecognizerBackend::Heuristic,
            "command" => RecognizerBackend::Command,
            "disabled" => RecognizerBackend::Disabled,
            other => {
                return Err(PhiError::Configuration(format!(
                    "Invalid PHIGUARD_RECOGNIZER_BACKEND '{}'. Must be one of: heuristic, command, disabled",
                    other
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("PHIGUARD_RECOGNIZER_COMMAND") {
        config.recognizer.command = val.split_whitespace().map(String::from).collect();
    }

    // Redaction overrides
    if let Ok(val) = std::env::var("PHIGUARD_REDACTION_POLICY") {
        config.redaction.policy = val.parse().map_err(|e: PhiError| {
            PhiError::Configuration(format!("PHIGUARD_REDACTION_POLICY: {}", e))
        })?;
    }
    if let Ok(val) = std::env::var("PHIGUARD_REDACTION_MARKER") {
        config.redaction.marker = val;
    }
    if let Ok(val) = std::env::var("PHIGUARD_REDACTION_BOX_PADDING") {
        if let Ok(padding) = val.parse() {
            config.redaction.box_padding = padding;
        }
    }
    if let Ok(val) = std::env::var("PHIGUARD_REDACTION_MIN_MATCH_LENGTH") {
        if let Ok(length) = val.parse() {
            config.redaction.min_match_length = length;
        }
    }

    // Audit overrides
    if let Ok(val) = std::env::var("PHIGUARD_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PHIGUARD_AUDIT_LOG_PATH") {
        config.audit.log_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("PHIGUARD_AUDIT_HASH_SALT") {
        config.audit.hash_salt = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PHIGUARD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PHIGUARD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

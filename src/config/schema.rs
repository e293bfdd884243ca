//! Configuration schema types
//!
//! Every section and field has a default, so an empty file is a valid
//! configuration.

use crate::phi::detector::ContextTrigger;
use crate::phi::models::HandlingPolicy;
use crate::phi::transform::TokenMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Entity-recognition backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognizerBackend {
    /// Built-in rule-based recognizer
    #[default]
    Heuristic,
    /// External program invoked once per chunk
    Command,
    /// No entity recognition; pattern-only scanning
    Disabled,
}

/// Main PhiGuard configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhiGuardConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Scanner settings
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Entity recognizer settings
    #[serde(default)]
    pub recognizer: RecognizerConfig,

    /// Text transformation and page redaction settings
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// Audit log settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhiGuardConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.scanner.validate()?;
        self.recognizer.validate()?;
        self.redaction.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Rule file replacing the built-in pattern registry
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Characters per entity-recognition chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters inspected on each side of a single-token name
    #[serde(default = "default_name_context_window")]
    pub name_context_window: usize,

    /// Section headers that trigger a localized recognition pass
    #[serde(default = "ContextTrigger::defaults")]
    pub context_triggers: Vec<ContextTrigger>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            pattern_library: None,
            chunk_size: default_chunk_size(),
            name_context_window: default_name_context_window(),
            context_triggers: ContextTrigger::defaults(),
        }
    }
}

impl ScannerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("scanner.chunk_size must be greater than 0".to_string());
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                return Err(format!(
                    "scanner.pattern_library not found: {}",
                    path.display()
                ));
            }
        }

        for trigger in &self.context_triggers {
            if trigger.pattern.trim().is_empty() {
                return Err("scanner.context_triggers entries need a pattern".to_string());
            }
            if trigger.window == 0 {
                return Err(format!(
                    "scanner.context_triggers window for '{}' must be greater than 0",
                    trigger.pattern
                ));
            }
        }

        Ok(())
    }
}

/// Entity recognizer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Backend (heuristic, command, disabled)
    #[serde(default)]
    pub backend: RecognizerBackend,

    /// Program and arguments for the command backend; the chunk file path
    /// is appended as the last argument
    #[serde(default)]
    pub command: Vec<String>,

    /// Directory for the command backend's chunk files; the system temp
    /// directory when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Extra entity label to category entries, e.g. `WORK_OF_ART = "artwork"`
    #[serde(default)]
    pub label_map: HashMap<String, String>,
}

impl RecognizerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == RecognizerBackend::Command && self.command.is_empty() {
            return Err(
                "recognizer.command is required when recognizer.backend = 'command'".to_string(),
            );
        }
        Ok(())
    }
}

/// Text transformation and page redaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Policy used when a request does not select one
    #[serde(default)]
    pub policy: HandlingPolicy,

    /// Marker written by the redact policy
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Padding around each painted word box, in page units
    #[serde(default = "default_box_padding")]
    pub box_padding: f32,

    /// Findings shorter than this are not painted on pages
    #[serde(default = "default_min_match_length")]
    pub min_match_length: usize,

    /// Token length mode (match_length, fixed)
    #[serde(default)]
    pub token_mode: TokenMode,

    /// Token length for the fixed mode
    #[serde(default = "default_fixed_token_length")]
    pub fixed_token_length: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            policy: HandlingPolicy::default(),
            marker: default_marker(),
            box_padding: default_box_padding(),
            min_match_length: default_min_match_length(),
            token_mode: TokenMode::default(),
            fixed_token_length: default_fixed_token_length(),
        }
    }
}

impl RedactionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.marker.is_empty() {
            return Err("redaction.marker must not be empty".to_string());
        }

        if !(0.0..=72.0).contains(&self.box_padding) {
            return Err(format!(
                "redaction.box_padding must be between 0 and 72, got {}",
                self.box_padding
            ));
        }

        if self.token_mode == TokenMode::Fixed && self.fixed_token_length == 0 {
            return Err("redaction.fixed_token_length must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,

    /// Secret mixed into every audit digest; usually `${PHIGUARD_AUDIT_SALT}`
    #[serde(default)]
    pub hash_salt: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
            hash_salt: None,
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path is required when audit.enabled = true".to_string());
        }
        if matches!(self.hash_salt.as_deref(), Some(salt) if salt.is_empty()) {
            return Err("audit.hash_salt must not be empty when set".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_local_enabled")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: default_local_enabled(),
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_chunk_size() -> usize {
    crate::phi::detector::entity::DEFAULT_CHUNK_SIZE
}

fn default_name_context_window() -> usize {
    crate::phi::detector::entity::DEFAULT_NAME_CONTEXT_WINDOW
}

fn default_marker() -> String {
    crate::phi::transform::DEFAULT_MARKER.to_string()
}

fn default_box_padding() -> f32 {
    crate::phi::redactor::DEFAULT_BOX_PADDING
}

fn default_min_match_length() -> usize {
    crate::phi::redactor::DEFAULT_MIN_MATCH_LENGTH
}

fn default_fixed_token_length() -> usize {
    crate::phi::transform::DEFAULT_FIXED_TOKEN_LENGTH
}

fn default_audit_enabled() -> bool {
    false
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/phiguard.log")
}

fn default_audit_json_format() -> bool {
    true
}

fn default_local_enabled() -> bool {
    false
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: PhiGuardConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.scanner.chunk_size, 100_000);
        assert_eq!(config.scanner.name_context_window, 20);
        assert_eq!(config.scanner.context_triggers.len(), 6);
        assert_eq!(config.recognizer.backend, RecognizerBackend::Heuristic);
        assert_eq!(config.redaction.marker, "[REDACTED]");
        assert_eq!(config.redaction.min_match_length, 3);
        assert_eq!(config.redaction.token_mode, TokenMode::MatchLength);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_parse() {
        let config: PhiGuardConfig = toml::from_str(
            r#"
[recognizer]
backend = "command"
command = ["python3", "ner.py"]

[recognizer.label_map]
WORK_OF_ART = "artwork"

[redaction]
policy = "tokenize"
token_mode = "fixed"
fixed_token_length = 12

[[scanner.context_triggers]]
pattern = "NEXT OF KIN"
window = 250
"#,
        )
        .unwrap();

        assert_eq!(config.recognizer.backend, RecognizerBackend::Command);
        assert_eq!(config.recognizer.command, vec!["python3", "ner.py"]);
        assert_eq!(config.recognizer.label_map["WORK_OF_ART"], "artwork");
        assert_eq!(config.redaction.policy, HandlingPolicy::Tokenize);
        assert_eq!(config.redaction.token_mode, TokenMode::Fixed);
        assert_eq!(config.scanner.context_triggers, vec![ContextTrigger::new("NEXT OF KIN", 250)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = PhiGuardConfig::default();
        config.application.log_level = "loud".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_command_backend_requires_command() {
        let mut config = PhiGuardConfig::default();
        config.recognizer.backend = RecognizerBackend::Command;
        assert!(config.validate().unwrap_err().contains("recognizer.command"));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = PhiGuardConfig::default();
        config.scanner.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_pattern_library_rejected() {
        let mut config = PhiGuardConfig::default();
        config.scanner.pattern_library = Some(PathBuf::from("/nonexistent/rules.toml"));
        assert!(config.validate().unwrap_err().contains("pattern_library"));
    }

    #[test]
    fn test_unknown_policy_fails_to_parse() {
        let result: Result<PhiGuardConfig, _> = toml::from_str("[redaction]\npolicy = \"shred\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_rotation() {
        let mut config = PhiGuardConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}

//! Init command implementation
//!
//! Writes a sample configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "phiguard.toml")]
    pub output: String,

    /// Include comments explaining every option
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: phiguard validate-config");
                println!("  3. Process a document: phiguard process <file> --policy redact");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# PhiGuard Configuration File

[application]
log_level = "info"

[scanner]
chunk_size = 100000
name_context_window = 20

[recognizer]
backend = "heuristic"

[redaction]
policy = "redact"
marker = "[REDACTED]"
box_padding = 2.0
min_match_length = 3
token_mode = "match_length"

[audit]
enabled = false
log_path = "./audit/phiguard.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# PhiGuard Configuration File
#
# Every option has a default; an empty file is a valid configuration.
# Values may reference environment variables as ${VAR}, and any option can
# be overridden with PHIGUARD_<SECTION>_<KEY> (e.g. PHIGUARD_REDACTION_POLICY).

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Scanner Settings
# ============================================================================
[scanner]
# Optional rule file replacing the built-in pattern library
# pattern_library = "./patterns/custom.toml"

# Entity recognition works on chunks of at most this many characters
chunk_size = 100000

# Characters searched after a name/patient label for a person name
name_context_window = 20

# Context triggers: headers after which the text window is re-recognized
# [[scanner.context_triggers]]
# pattern = "(?i)patient\\s+information"
# window = 200

# ============================================================================
# Entity Recognizer
# ============================================================================
[recognizer]
# heuristic | command | disabled
# - heuristic: built-in rule-based recognizer
# - command: external program reading a text file, printing JSON entities
# - disabled: pattern rules only
backend = "heuristic"

# Program and arguments for the command backend; the chunk file path is
# appended as the last argument
# command = ["phi-ner", "--json"]

# Extra recognizer label to category mappings
# [recognizer.label_map]
# PATIENT = "NAME"
# WARD = "FACILITY"

# ============================================================================
# Redaction Settings
# ============================================================================
[redaction]
# Default policy when a request does not choose one (redact, tokenize, remove)
policy = "redact"

# Text written in place of redacted values
marker = "[REDACTED]"

# Points of padding around each painted box
box_padding = 2.0

# Findings shorter than this are not painted on pages
min_match_length = 3

# Token length: match_length (same as the value) or fixed
token_mode = "match_length"
fixed_token_length = 8

# ============================================================================
# Audit Log
# ============================================================================
[audit]
# One entry per processed request; finding values and the document name
# are stored as SHA-256 digests
enabled = false
log_path = "./audit/phiguard.log"
json_format = true
# Secret mixed into every digest; keep it out of version control
# hash_salt = "${PHIGUARD_AUDIT_SALT}"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
        .to_string()
    }
}

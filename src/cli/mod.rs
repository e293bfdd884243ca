//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for PhiGuard using clap.

pub mod commands;

use crate::config::LoggingConfig;
use clap::{Parser, Subcommand};

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "phiguard.toml";

/// PhiGuard - PHI detection and redaction
#[derive(Parser, Debug)]
#[command(name = "phiguard")]
#[command(version, about, long_about = None)]
#[command(author = "PhiGuard Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "PHIGUARD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHIGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level and logging settings for this invocation
    ///
    /// `process` and `scan` take `application.log_level` and the `[logging]`
    /// table from their configuration; `--log-level` wins over the configured
    /// level. Other commands, and configurations that fail to load, log to
    /// the console only; the command itself reports the load error.
    pub fn logging_settings(&self) -> (String, LoggingConfig) {
        let console_only = LoggingConfig {
            local_enabled: false,
            ..LoggingConfig::default()
        };

        let loaded = match &self.command {
            Commands::Process(_) | Commands::Scan(_) => {
                commands::load_or_default(&self.config).ok()
            }
            Commands::ValidateConfig(_) | Commands::Init(_) => None,
        };

        match loaded {
            Some(config) => {
                let level = self
                    .log_level
                    .clone()
                    .unwrap_or(config.application.log_level);
                (level, config.logging)
            }
            None => (
                self.log_level.clone().unwrap_or_else(|| "info".to_string()),
                console_only,
            ),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect and redact, tokenize or remove PHI in a document
    Process(commands::process::ProcessArgs),

    /// Report detected PHI without changing the document
    Scan(commands::scan::ScanArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

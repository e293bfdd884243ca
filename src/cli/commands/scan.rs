//! Scan command implementation
//!
//! Extracts and scans a document, then prints a findings report. The
//! document itself is left untouched.

use super::{load_or_default, EXIT_CONFIG_ERROR, EXIT_PROCESSING_ERROR, EXIT_SUCCESS};
use crate::config::RecognizerBackend;
use crate::extract::{self, DocumentFormat};
use crate::phi::{PhiEngine, ScanReport};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Document to scan
    pub input: PathBuf,

    /// Include detected values in the report
    #[arg(long)]
    pub show_values: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };
        let engine = match PhiEngine::from_config(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Failed to initialize engine: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let payload = match tokio::fs::read(&self.input).await {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("❌ Failed to read {}: {e}", self.input.display());
                return Ok(EXIT_PROCESSING_ERROR);
            }
        };

        let name = self.input.display().to_string();
        let format = DocumentFormat::detect(&name);
        let started = Instant::now();

        let document = match extract::extract(&payload, format) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_PROCESSING_ERROR);
            }
        };
        let text = document.text();
        let findings = match engine.detect(&text).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("❌ Scan failed: {e}");
                return Ok(EXIT_PROCESSING_ERROR);
            }
        };

        let mut report = ScanReport::new(name, text.chars().count(), &findings)
            .with_scan_time(started.elapsed().as_millis() as u64);
        if let Some(pages) = document.page_count() {
            report = report.with_pages(pages);
        }
        if self.show_values {
            report = report.with_values(&findings);
        }
        if format == DocumentFormat::Doc {
            report.add_warning("Legacy .doc file was not parsed");
        }
        if engine.runtime().backend() == RecognizerBackend::Disabled {
            report.add_warning("Entity recognizer disabled; pattern rules only");
        }

        if self.json {
            println!("{}", report.format_json()?);
        } else {
            print!("{}", report.format_console());
        }
        Ok(EXIT_SUCCESS)
    }
}

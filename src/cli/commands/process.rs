//! Process command implementation
//!
//! Runs one document through the upload service and writes the processed
//! artifact next to the input (or to `--output`).

use super::{load_or_default, EXIT_CONFIG_ERROR, EXIT_PROCESSING_ERROR, EXIT_SUCCESS};
use crate::domain::PhiError;
use crate::phi::PhiEngine;
use crate::service::{UploadRequest, UploadResponse, UploadService};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Document to process (.pdf, .docx, .doc or text)
    pub input: PathBuf,

    /// Handling policy (redact, tokenize, remove); defaults to the
    /// configured policy
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Output path; defaults to `<input stem>_phiguard.<pdf|txt>`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the transport response as JSON instead of writing a file
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    /// Execute the process command
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
        if let Err(e) = engine.warm_up() {
            eprintln!("❌ {e}");
            return Ok(EXIT_PROCESSING_ERROR);
        }

        let payload = match tokio::fs::read(&self.input).await {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("❌ Failed to read {}: {e}", self.input.display());
                return Ok(EXIT_PROCESSING_ERROR);
            }
        };

        let filename = self
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let request = UploadRequest::new(filename, payload, self.policy.as_deref());
        let service = UploadService::new(Arc::new(engine));

        if self.json {
            let response = service.handle(request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(exit_code_for(&response));
        }

        let processed = match service.process(&request).await {
            Ok(p) => p,
            Err(e) => {
                eprintln!("❌ Processing failed: {e}");
                return Ok(exit_code_for_error(&e));
            }
        };

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input, processed.format));
        tokio::fs::write(&output, &processed.bytes).await?;

        let outcome = &processed.outcome;
        println!("✅ Processed {}", self.input.display());
        println!("  Policy: {}", outcome.policy);
        println!("  Findings: {}", outcome.findings.total_findings());
        for (category, values) in outcome.findings.iter() {
            if !values.is_empty() {
                println!("    {category}: {}", values.len());
            }
        }
        if let crate::phi::ProcessedArtifact::Paginated(ref doc) = outcome.artifact {
            if doc.passthrough {
                println!("  Redactions: none (document unchanged)");
            } else {
                println!("  Redactions: {}", doc.total_redactions());
            }
        }
        println!("  Output: {}", output.display());
        Ok(EXIT_SUCCESS)
    }
}

/// `<dir>/<stem>_phiguard.<tag>`
pub fn default_output_path(input: &Path, tag: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_phiguard.{tag}"))
}

fn exit_code_for(response: &UploadResponse) -> i32 {
    match response.status_code() {
        200 => EXIT_SUCCESS,
        _ => EXIT_PROCESSING_ERROR,
    }
}

fn exit_code_for_error(error: &PhiError) -> i32 {
    match error {
        PhiError::Configuration(_) | PhiError::Pattern(_) => EXIT_CONFIG_ERROR,
        _ => EXIT_PROCESSING_ERROR,
    }
}

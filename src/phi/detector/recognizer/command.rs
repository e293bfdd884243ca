//! External-program entity recognizer
//!
//! Runs a configured program once per chunk. The chunk is written to a
//! scoped temporary file whose path is appended as the last argument; the
//! program prints a JSON array of `{label, text, start, end}` objects on
//! stdout. The temporary file is removed on every exit path.

use super::{EntityRecognizer, RecognizedEntity};
use crate::domain::{PhiError, Result};
use anyhow::{bail, Context};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Recognizer backed by an external program (for example a wrapper around a
/// statistical NER model)
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    scratch_dir: Option<PathBuf>,
}

impl CommandRecognizer {
    /// Resolve the program from an argv list (`[program, args...]`)
    ///
    /// # Errors
    ///
    /// [`PhiError::ModelUnavailable`] if the argv is empty or the program
    /// cannot be found on `PATH`.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            PhiError::ModelUnavailable("recognizer.command must name a program".to_string())
        })?;

        let program = which::which(program).map_err(|e| {
            PhiError::ModelUnavailable(format!("Recognizer program '{program}' not found: {e}"))
        })?;

        Ok(Self {
            program,
            args: args.to_vec(),
            scratch_dir: None,
        })
    }

    /// Write chunk files under `dir` instead of the system temp directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Resolved program path
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl EntityRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        "command"
    }

    fn recognize(&self, chunk: &str) -> anyhow::Result<Vec<RecognizedEntity>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("phiguard-chunk-").suffix(".txt");
        let mut input = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("Failed to create recognizer input file")?;
        input
            .write_all(chunk.as_bytes())
            .context("Failed to write recognizer input file")?;
        input.flush()?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(input.path())
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Recognizer exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        let entities: Vec<RecognizedEntity> = serde_json::from_slice(&output.stdout)
            .context("Recognizer output is not a JSON entity array")?;
        Ok(entities)
    }
}

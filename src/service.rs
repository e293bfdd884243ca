//! Upload request boundary
//!
//! One operation: take an uploaded document and a handling-policy selector,
//! return the processed artifact encoded for transport or an error body.
//! Error responses never carry an artifact.

use crate::domain::{PhiError, Result};
use crate::extract::{self, DocumentFormat, ExtractedDocument};
use crate::phi::transform::parse_policy;
use crate::phi::{PhiEngine, ProcessOutcome, ProcessedArtifact};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Uploaded document with its handling policy
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original file name; its extension selects the format
    pub filename: String,
    /// Raw document bytes
    pub payload: Vec<u8>,
    /// Policy selector (`redact`, `tokenize`, `remove`); the configured
    /// default when absent
    pub policy: Option<String>,
}

impl UploadRequest {
    pub fn new(filename: impl Into<String>, payload: Vec<u8>, policy: Option<&str>) -> Self {
        Self {
            filename: filename.into(),
            payload,
            policy: policy.map(str::to_string),
        }
    }
}

/// Transport response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResponse {
    /// Processed artifact, base64-encoded, with its format tag
    Success { file: String, format: String },
    /// Error kind and message; no artifact
    Error {
        kind: String,
        message: String,
        #[serde(skip)]
        status: u16,
    },
}

impl UploadResponse {
    /// Build an error response from a failure
    pub fn from_error(error: &PhiError) -> Self {
        Self::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
            status: error.status_code(),
        }
    }

    /// HTTP-style status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Error { status, .. } => *status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Processed upload before transport encoding
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    /// Output bytes (PDF or UTF-8 text)
    pub bytes: Vec<u8>,
    /// Output format tag (`pdf` or `txt`)
    pub format: &'static str,
    /// Input format
    pub input_format: DocumentFormat,
    pub outcome: ProcessOutcome,
}

/// Handles upload requests against a shared engine
#[derive(Clone)]
pub struct UploadService {
    engine: Arc<PhiEngine>,
}

impl UploadService {
    pub fn new(engine: Arc<PhiEngine>) -> Self {
        Self { engine }
    }

    /// Handle one upload, mapping every failure to an error response
    pub async fn handle(&self, request: UploadRequest) -> UploadResponse {
        match self.process(&request).await {
            Ok(processed) => UploadResponse::Success {
                file: STANDARD.encode(&processed.bytes),
                format: processed.format.to_string(),
            },
            Err(e) => {
                crate::log_request_failure!(e, request.filename.as_str());
                UploadResponse::from_error(&e)
            }
        }
    }

    /// Process one upload
    ///
    /// The policy is validated before the document is touched.
    pub async fn process(&self, request: &UploadRequest) -> Result<ProcessedUpload> {
        let policy = match request.policy.as_deref() {
            Some(selector) => parse_policy(selector)?,
            None => self.engine.default_policy(),
        };

        let format = DocumentFormat::detect(&request.filename);
        tracing::info!(
            %format,
            bytes = request.payload.len(),
            %policy,
            "Processing upload"
        );

        let document = extract::extract(&request.payload, format)?;
        let outcome = match document {
            ExtractedDocument::Paginated { ref pages } => {
                self.engine
                    .process_pages(&request.filename, &request.payload, pages, policy)
                    .await?
            }
            ExtractedDocument::Flow { ref text } => {
                self.engine
                    .process_text(&request.filename, text, policy)
                    .await?
            }
        };

        let bytes = match outcome.artifact {
            ProcessedArtifact::Paginated(ref redacted) => redacted.bytes.clone(),
            ProcessedArtifact::Text(ref text) => text.clone().into_bytes(),
        };

        Ok(ProcessedUpload {
            bytes,
            format: format.output_tag(),
            input_format: format,
            outcome,
        })
    }
}

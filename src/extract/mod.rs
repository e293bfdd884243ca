//! Document text extraction
//!
//! Turns an uploaded payload into the input the PHI engine works on: page
//! words with coordinates for paginated documents, plain text for
//! everything else. The format is chosen from the file extension.

pub mod docx;
pub mod pdf;

use crate::domain::Result;
use crate::phi::redactor::PageWords;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Text returned for legacy `.doc` uploads
pub const LEGACY_DOC_MESSAGE: &str = "This is a .doc file. PDF or DOCX files are preferred.";

/// Input format, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Paginated; redacted in place
    Pdf,
    /// Flow document; output is derived text
    Docx,
    /// Legacy word-processor format; not parsed
    Doc,
    /// Anything else, handled as text
    Text,
}

impl DocumentFormat {
    /// Detect the format of `filename` (case-insensitive extension)
    pub fn detect(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("doc") => Self::Doc,
            _ => Self::Text,
        }
    }

    /// Format tag reported alongside the processed artifact
    pub fn output_tag(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx | Self::Doc | Self::Text => "txt",
        }
    }

    /// Whether the output keeps the input's pages
    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// Extracted document content
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedDocument {
    /// Pages with word coordinates
    Paginated { pages: Vec<PageWords> },
    /// Plain text
    Flow { text: String },
}

impl ExtractedDocument {
    /// Full document text; pages are separated by newlines
    pub fn text(&self) -> String {
        match self {
            Self::Paginated { pages } => pages
                .iter()
                .map(|page| page.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Flow { text } => text.clone(),
        }
    }

    /// Page count for paginated documents
    pub fn page_count(&self) -> Option<usize> {
        match self {
            Self::Paginated { pages } => Some(pages.len()),
            Self::Flow { .. } => None,
        }
    }
}

/// Extract the content of `bytes` in the given format
///
/// # Errors
///
/// [`PhiError::Extraction`](crate::domain::PhiError::Extraction) when a PDF
/// or DOCX payload cannot be parsed at all. Legacy `.doc` files and plain
/// text never fail.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<ExtractedDocument> {
    let document = match format {
        DocumentFormat::Pdf => ExtractedDocument::Paginated {
            pages: pdf::extract_pages(bytes)?,
        },
        DocumentFormat::Docx => ExtractedDocument::Flow {
            text: docx::extract_text(bytes)?,
        },
        DocumentFormat::Doc => {
            tracing::warn!("Legacy .doc upload; returning unsupported-format message");
            ExtractedDocument::Flow {
                text: LEGACY_DOC_MESSAGE.to_string(),
            }
        }
        DocumentFormat::Text => ExtractedDocument::Flow {
            text: String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    tracing::debug!(%format, pages = ?document.page_count(), "Document extracted");
    Ok(document)
}

// PhiGuard - PHI Detection and Redaction Engine
// Copyright (c) 2025 PhiGuard Contributors
// Licensed under the MIT License

//! # PhiGuard - PHI Detection and Redaction
//!
//! PhiGuard finds Protected Health Information in clinical documents and
//! redacts, tokenizes or removes it.
//!
//! ## Overview
//!
//! - **Extraction**: PDF pages with word coordinates, DOCX paragraphs, raw text
//! - **Detection**: pattern rules, entity recognition and context-triggered
//!   recognition, run concurrently and merged into one findings map
//! - **Transformation**: plain-text rewriting for flow documents
//! - **Page redaction**: opaque overlays on PDF pages, original content kept
//!   underneath
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`service`] - Upload request boundary
//! - [`extract`] - Document text extraction
//! - [`phi`] - Detection, aggregation, transformation, redaction, audit
//! - [`domain`] - Error type and result alias
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phiguard::config::load_config;
//! use phiguard::phi::PhiEngine;
//! use phiguard::service::{UploadRequest, UploadService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("phiguard.toml")?;
//!     let engine = PhiEngine::from_config(&config)?;
//!     engine.warm_up()?;
//!
//!     let service = UploadService::new(Arc::new(engine));
//!     let bytes = std::fs::read("discharge.pdf")?;
//!     let response = service
//!         .handle(UploadRequest::new("discharge.pdf", bytes, Some("redact")))
//!         .await;
//!
//!     println!("status {}", response.status_code());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], whose error type
//! [`domain::PhiError`] carries a stable kind tag and an HTTP-style status:
//!
//! ```rust
//! use phiguard::phi::transform::parse_policy;
//!
//! let err = parse_policy("shred").unwrap_err();
//! assert_eq!(err.kind(), "unsupported_policy");
//! assert_eq!(err.status_code(), 400);
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod logging;
pub mod phi;
pub mod service;

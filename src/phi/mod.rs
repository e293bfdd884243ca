//! PHI detection and redaction
//!
//! Detection runs three independent scanners over document text (pattern
//! rules, entity recognition, context-triggered recognition) and merges
//! their output into a deduplicated [`FindingsMap`]. The findings are then
//! either written into plain text by the [`TextTransformer`] or painted over
//! the pages of a paginated document by the [`PageRedactor`].
//!
//! # Example
//!
//! ```
//! use phiguard::phi::{FindingsMap, HandlingPolicy, PhiCategory, TextTransformer};
//!
//! let mut findings = FindingsMap::new();
//! findings.insert(PhiCategory::Ssn, "123-45-6789");
//!
//! let text = TextTransformer::new()
//!     .transform("SSN: 123-45-6789", &findings, HandlingPolicy::Redact)
//!     .unwrap();
//! assert_eq!(text, "SSN: [REDACTED]");
//! ```

pub mod aggregate;
pub mod audit;
pub mod detector;
pub mod engine;
pub mod models;
pub mod redactor;
pub mod report;
pub mod text;
pub mod transform;

pub use aggregate::aggregate;
pub use audit::AuditLogger;
pub use detector::{
    ContextScanner, EntityRecognizer, EntityScanner, PatternScanner, PhiScanner, RecognizerRuntime,
};
pub use engine::{PhiEngine, ProcessOutcome, ProcessedArtifact};
pub use models::{CategoryRegistry, FindingsMap, HandlingPolicy, PhiCategory};
pub use redactor::{PageRedactor, PageWords, RedactedDocument, Word};
pub use report::ScanReport;
pub use transform::{TextTransformer, TokenMode};

//! PHI detection module
//!
//! Provides the scanner interface and the three detection strategies:
//! pattern rules, delegated entity recognition, and context-triggered
//! re-scanning of clinical section headers.

pub mod context;
pub mod entity;
pub mod pattern;
pub mod patterns;
pub mod recognizer;

pub use context::{ContextScanner, ContextTrigger};
pub use entity::EntityScanner;
pub use pattern::PatternScanner;
pub use recognizer::{EntityLabelMap, EntityRecognizer, RecognizedEntity, RecognizerRuntime};

use crate::domain::Result;
use crate::phi::models::FindingsMap;

/// Trait for PHI scanning strategies
///
/// Scanners are independent of each other and hold no per-request state, so
/// one instance can be shared across concurrent requests.
pub trait PhiScanner: Send + Sync {
    /// Scanner identifier used in logs
    fn name(&self) -> &str;

    /// Scan text and return every finding, deduplicated per category
    fn scan(&self, text: &str) -> Result<FindingsMap>;
}

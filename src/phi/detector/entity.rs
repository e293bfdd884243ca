//! Entity-recognition scanner

use super::recognizer::{EntityLabelMap, RecognizerRuntime};
use super::PhiScanner;
use crate::domain::Result;
use crate::phi::models::{FindingsMap, PhiCategory};
use crate::phi::text;
use regex::Regex;
use std::sync::Arc;

/// Default recognition window, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Default radius searched around single-token person names, in characters
pub const DEFAULT_NAME_CONTEXT_WINDOW: usize = 20;

const TITLE_PREFIX_PATTERN: &str = r"\b(?:Dr\.|Mr\.|Mrs\.|Ms\.|Professor|MD|PhD)\s+([A-Z][a-z]+)";

/// Scans text by delegating to the shared entity recognizer
///
/// Text is split into fixed-size, non-overlapping windows and the recognizer
/// is invoked once per window. A window whose recognition fails is logged
/// and skipped; the remaining windows still contribute.
pub struct EntityScanner {
    runtime: Arc<RecognizerRuntime>,
    label_map: EntityLabelMap,
    chunk_size: usize,
    name_window: usize,
    title_prefix: Regex,
}

impl EntityScanner {
    /// Create a scanner with default window sizes and label table
    pub fn new(runtime: Arc<RecognizerRuntime>) -> Result<Self> {
        Ok(Self {
            runtime,
            label_map: EntityLabelMap::standard(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            name_window: DEFAULT_NAME_CONTEXT_WINDOW,
            title_prefix: Regex::new(TITLE_PREFIX_PATTERN)?,
        })
    }

    /// Set the recognition window size (characters)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the title-prefix search radius (characters)
    pub fn with_name_window(mut self, name_window: usize) -> Self {
        self.name_window = name_window;
        self
    }

    /// Replace the entity label table
    pub fn with_label_map(mut self, label_map: EntityLabelMap) -> Self {
        self.label_map = label_map;
        self
    }

    /// Configured window size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn refine_name(&self, chunk: &str, start: usize, end: usize, findings: &mut FindingsMap) {
        let window = text::surrounding(chunk, start, end, self.name_window);
        for caps in self.title_prefix.captures_iter(window) {
            if let Some(name) = caps.get(1) {
                findings.insert(PhiCategory::Name, name.as_str());
            }
        }
    }
}

impl PhiScanner for EntityScanner {
    fn name(&self) -> &str {
        "entity"
    }

    fn scan(&self, text: &str) -> Result<FindingsMap> {
        let mut findings = FindingsMap::new();
        let Some(recognizer) = self.runtime.recognizer()? else {
            return Ok(findings);
        };

        let chunks = text::chunks(text, self.chunk_size);
        tracing::debug!(
            recognizer = recognizer.name(),
            chunks = chunks.len(),
            "Running entity recognition"
        );

        for (chunk_index, chunk) in chunks.into_iter().enumerate() {
            let entities = match recognizer.recognize(chunk) {
                Ok(entities) => entities,
                Err(e) => {
                    tracing::warn!(chunk_index, error = %e, "Entity recognition failed for chunk; skipping");
                    continue;
                }
            };

            for entity in entities {
                let Some(category) = self.label_map.category_for(&entity.label) else {
                    continue;
                };
                let single_token = !entity.text.trim().contains(char::is_whitespace);
                let is_person = *category == PhiCategory::Name;

                findings.insert(category.clone(), entity.text);
                if is_person && single_token {
                    self.refine_name(chunk, entity.start, entity.end, &mut findings);
                }
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::detector::recognizer::testing::ScriptedRecognizer;

    fn scanner(recognizer: ScriptedRecognizer) -> (EntityScanner, Arc<ScriptedRecognizer>) {
        let recognizer = Arc::new(recognizer);
        let runtime = Arc::new(RecognizerRuntime::with_recognizer(recognizer.clone()));
        (EntityScanner::new(runtime).unwrap(), recognizer)
    }

    #[test]
    fn test_maps_labels_to_categories() {
        let (scanner, _) = scanner(ScriptedRecognizer::new(&[
            ("PERSON", "Jane Doe"),
            ("GPE", "Boston"),
            ("ORG", "Acme Clinic"),
            ("MONEY", "$40"),
        ]));
        let findings = scanner
            .scan("Jane Doe from Boston paid $40 at Acme Clinic")
            .unwrap();

        assert!(findings.contains(&PhiCategory::Name, "Jane Doe"));
        assert!(findings.contains(&PhiCategory::Location, "Boston"));
        assert!(findings.contains(&PhiCategory::Organization, "Acme Clinic"));
        assert_eq!(findings.total_findings(), 3);
    }

    #[test]
    fn test_single_token_person_title_refinement() {
        let (scanner, _) = scanner(ScriptedRecognizer::new(&[("PERSON", "Smith")]));
        let findings = scanner.scan("Reviewed by Dr. Smith and Mr. Jones").unwrap();

        assert!(findings.contains(&PhiCategory::Name, "Smith"));
        // Window of 20 chars around "Smith" reaches "Mr. Jones"
        assert!(findings.contains(&PhiCategory::Name, "Jones"));
    }

    #[test]
    fn test_title_outside_window_is_ignored() {
        let (scanner, _) = scanner(ScriptedRecognizer::new(&[("PERSON", "Smith")]));
        // "Dr. Jones" ends 34 characters before "Smith"
        let findings = scanner
            .scan("Dr. Jones wrote a long referral note about Smith")
            .unwrap();

        assert!(findings.contains(&PhiCategory::Name, "Smith"));
        assert!(!findings.contains(&PhiCategory::Name, "Jones"));
        assert!(!findings.contains(&PhiCategory::Name, "Dr. Jones"));
        assert_eq!(findings.total_findings(), 1);
    }

    #[test]
    fn test_title_window_is_configurable() {
        let (scanner, _) = scanner(ScriptedRecognizer::new(&[("PERSON", "Smith")]));
        let scanner = scanner.with_name_window(60);
        let findings = scanner
            .scan("Dr. Jones wrote a long referral note about Smith")
            .unwrap();
        assert!(findings.contains(&PhiCategory::Name, "Jones"));
    }

    #[test]
    fn test_multi_token_person_is_not_refined() {
        let (scanner, _) = scanner(ScriptedRecognizer::new(&[("PERSON", "Anna Smith")]));
        let findings = scanner.scan("Dr. Lee met Anna Smith").unwrap();
        assert!(findings.contains(&PhiCategory::Name, "Anna Smith"));
        assert!(!findings.contains(&PhiCategory::Name, "Lee"));
    }

    #[test]
    fn test_text_is_chunked() {
        let (scanner, recognizer) = scanner(ScriptedRecognizer::new(&[]));
        let scanner = scanner.with_chunk_size(10);
        scanner.scan(&"x".repeat(35)).unwrap();
        assert_eq!(recognizer.calls(), 4);
    }

    #[test]
    fn test_failed_chunk_is_skipped() {
        let (scanner, _) =
            scanner(ScriptedRecognizer::new(&[("PERSON", "Alice"), ("PERSON", "Bob")]).failing_on("BAD"));
        let scanner = scanner.with_chunk_size(10);
        // chunks: "Alice BAD " | "and Bob..."
        let findings = scanner.scan("Alice BAD and Bob here").unwrap();

        assert!(!findings.contains(&PhiCategory::Name, "Alice"));
        assert!(findings.contains(&PhiCategory::Name, "Bob"));
    }

    #[test]
    fn test_disabled_recognizer_returns_empty() {
        let scanner = EntityScanner::new(Arc::new(RecognizerRuntime::disabled())).unwrap();
        assert!(scanner.scan("Dr. Smith").unwrap().is_empty());
    }
}

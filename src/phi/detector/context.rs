//! Context-triggered re-scanning of clinical section headers

use super::recognizer::{EntityLabelMap, RecognizerRuntime};
use super::PhiScanner;
use crate::domain::Result;
use crate::phi::models::{FindingsMap, PhiCategory};
use crate::phi::text;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Section header that triggers a localized recognition pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTrigger {
    /// Header pattern (regex, matched case-insensitively)
    pub pattern: String,
    /// Characters after the header handed to the recognizer
    pub window: usize,
}

impl ContextTrigger {
    /// Create a trigger
    pub fn new(pattern: impl Into<String>, window: usize) -> Self {
        Self {
            pattern: pattern.into(),
            window,
        }
    }

    /// Clinical section headers where PHI is densest
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("PATIENT INFORMATION", 400),
            Self::new("DEMOGRAPHICS", 300),
            Self::new("PERSONAL HISTORY", 300),
            Self::new("FAMILY HISTORY", 300),
            Self::new("SOCIAL HISTORY", 300),
            Self::new("CONTACT INFORMATION", 400),
        ]
    }
}

/// Re-invokes the recognizer on the window following each section header
///
/// Only person, organization and location entities are kept from these
/// windows.
pub struct ContextScanner {
    runtime: Arc<RecognizerRuntime>,
    label_map: EntityLabelMap,
    triggers: Vec<(Regex, usize)>,
}

impl ContextScanner {
    /// Create a scanner with the default clinical section headers
    pub fn new(runtime: Arc<RecognizerRuntime>) -> Self {
        Self::with_triggers(runtime, &ContextTrigger::defaults())
    }

    /// Create a scanner with custom triggers
    ///
    /// A trigger whose pattern does not compile is logged and skipped.
    pub fn with_triggers(runtime: Arc<RecognizerRuntime>, triggers: &[ContextTrigger]) -> Self {
        let triggers = triggers
            .iter()
            .filter_map(|trigger| {
                match RegexBuilder::new(&trigger.pattern)
                    .case_insensitive(true)
                    .build()
                {
                    Ok(regex) => Some((regex, trigger.window)),
                    Err(e) => {
                        tracing::warn!(
                            trigger = %trigger.pattern,
                            error = %e,
                            "Skipping malformed context trigger"
                        );
                        None
                    }
                }
            })
            .collect();

        Self {
            runtime,
            label_map: EntityLabelMap::standard(),
            triggers,
        }
    }

    /// Replace the entity label table
    pub fn with_label_map(mut self, label_map: EntityLabelMap) -> Self {
        self.label_map = label_map;
        self
    }

    /// Number of active triggers
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }
}

impl PhiScanner for ContextScanner {
    fn name(&self) -> &str {
        "context"
    }

    fn scan(&self, text: &str) -> Result<FindingsMap> {
        let mut findings = FindingsMap::new();
        let Some(recognizer) = self.runtime.recognizer()? else {
            return Ok(findings);
        };

        for (trigger, window) in &self.triggers {
            for header in trigger.find_iter(text) {
                let section = text::following(text, header.end(), *window);
                let entities = match recognizer.recognize(section) {
                    Ok(entities) => entities,
                    Err(e) => {
                        tracing::warn!(
                            trigger = trigger.as_str(),
                            offset = header.start(),
                            error = %e,
                            "Context recognition failed; skipping section"
                        );
                        continue;
                    }
                };

                for entity in entities {
                    match self.label_map.category_for(&entity.label) {
                        Some(
                            category @ (PhiCategory::Name
                            | PhiCategory::Organization
                            | PhiCategory::Location),
                        ) => {
                            findings.insert(category.clone(), entity.text);
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(findings)
    }
}

//! Entity recognition capability
//!
//! The scanners never talk to a concrete model. They receive an
//! [`EntityRecognizer`] through a [`RecognizerRuntime`], which is created once
//! per process, initializes its backend lazily on first use, and is shared
//! read-only by every request.
//!
//! # Lifecycle
//!
//! 1. [`RecognizerRuntime::new`] records the backend configuration; nothing
//!    is loaded yet.
//! 2. The first call to [`RecognizerRuntime::recognizer`] (or an explicit
//!    [`warm_up`](RecognizerRuntime::warm_up) at startup) initializes the
//!    backend. The outcome, success or failure, is cached for the lifetime
//!    of the runtime; a failed initialization is never retried per request.
//! 3. [`RecognizerRuntime::shutdown`] drops the runtime's handle. In-flight
//!    requests keep their own `Arc` until they finish.

pub mod command;
pub mod heuristic;

pub use command::CommandRecognizer;
pub use heuristic::HeuristicRecognizer;

use crate::config::{RecognizerBackend, RecognizerConfig};
use crate::domain::{PhiError, Result};
use crate::phi::models::{CategoryRegistry, PhiCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Labelled span returned by a recognizer
///
/// `start` and `end` are byte offsets into the chunk that was recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    /// Entity kind label (e.g. `PERSON`, `GPE`, `ORG`)
    pub label: String,
    /// Span text
    pub text: String,
    /// Start offset in the chunk
    pub start: usize,
    /// End offset in the chunk
    pub end: usize,
}

impl RecognizedEntity {
    /// Create a new entity
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

/// Trait for entity-recognition backends
///
/// Implementations must be safe to call repeatedly and concurrently once
/// constructed.
pub trait EntityRecognizer: Send + Sync {
    /// Human-readable backend identifier
    fn name(&self) -> &str;

    /// Recognize entities in a bounded chunk of text
    fn recognize(&self, chunk: &str) -> anyhow::Result<Vec<RecognizedEntity>>;
}

/// Mapping from recognizer entity labels to PHI categories
#[derive(Debug, Clone)]
pub struct EntityLabelMap {
    entries: HashMap<String, PhiCategory>,
}

impl EntityLabelMap {
    /// Default table: person, places, organizations, facilities,
    /// nationality/religious/political groups, events
    pub fn standard() -> Self {
        let entries = [
            ("PERSON", PhiCategory::Name),
            ("GPE", PhiCategory::Location),
            ("LOC", PhiCategory::Location),
            ("ORG", PhiCategory::Organization),
            ("FAC", PhiCategory::Facility),
            ("NORP", PhiCategory::Demographic),
            ("EVENT", PhiCategory::Event),
        ]
        .into_iter()
        .map(|(label, category)| (label.to_string(), category))
        .collect();

        Self { entries }
    }

    /// Standard table extended with configured `label = "CATEGORY"` entries
    ///
    /// Category names resolve through the registration table; unregistered
    /// names become custom categories.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let registry = CategoryRegistry::builtin();
        let mut map = Self::standard();
        for (label, category) in overrides {
            map.entries
                .insert(label.trim().to_uppercase(), registry.resolve_open(category));
        }
        map
    }

    /// Category for an entity label, if the label is mapped
    pub fn category_for(&self, label: &str) -> Option<&PhiCategory> {
        self.entries.get(&label.trim().to_uppercase())
    }
}

impl Default for EntityLabelMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Process-scoped, lazily initialized recognition resource
pub struct RecognizerRuntime {
    config: RecognizerConfig,
    cell: OnceLock<std::result::Result<Option<Arc<dyn EntityRecognizer>>, String>>,
}

impl RecognizerRuntime {
    /// Create a runtime for the configured backend; nothing is loaded yet
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            cell: OnceLock::new(),
        }
    }

    /// Runtime wrapping an already-constructed recognizer
    pub fn with_recognizer(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(Some(recognizer)));
        Self {
            config: RecognizerConfig::default(),
            cell,
        }
    }

    /// Runtime with recognition explicitly disabled (pattern-only scanning)
    pub fn disabled() -> Self {
        Self::new(RecognizerConfig {
            backend: RecognizerBackend::Disabled,
            ..RecognizerConfig::default()
        })
    }

    /// The recognizer, initializing it on first use
    ///
    /// Returns `Ok(None)` when recognition is disabled by configuration.
    ///
    /// # Errors
    ///
    /// [`PhiError::ModelUnavailable`] if the backend failed to initialize,
    /// now or on an earlier call.
    pub fn recognizer(&self) -> Result<Option<Arc<dyn EntityRecognizer>>> {
        self.cell
            .get_or_init(|| initialize(&self.config))
            .clone()
            .map_err(PhiError::ModelUnavailable)
    }

    /// Force initialization, surfacing failure at startup
    pub fn warm_up(&self) -> Result<()> {
        match self.recognizer()? {
            Some(recognizer) => {
                tracing::info!(backend = recognizer.name(), "Entity recognizer ready");
            }
            None => {
                tracing::warn!("Entity recognition disabled; scanning is pattern-only");
            }
        }
        Ok(())
    }

    /// Backend this runtime was configured with
    pub fn backend(&self) -> RecognizerBackend {
        self.config.backend
    }

    /// Release the runtime's handle on the recognizer
    pub fn shutdown(self) {
        let initialized = matches!(self.cell.get(), Some(Ok(Some(_))));
        drop(self);
        tracing::debug!(initialized, "Entity recognizer runtime shut down");
    }
}

fn initialize(
    config: &RecognizerConfig,
) -> std::result::Result<Option<Arc<dyn EntityRecognizer>>, String> {
    let recognizer: Arc<dyn EntityRecognizer> = match config.backend {
        RecognizerBackend::Disabled => return Ok(None),
        RecognizerBackend::Heuristic => {
            Arc::new(HeuristicRecognizer::new().map_err(|e| e.to_string())?)
        }
        RecognizerBackend::Command => {
            let mut recognizer =
                CommandRecognizer::from_argv(&config.command).map_err(|e| e.to_string())?;
            if let Some(dir) = &config.scratch_dir {
                recognizer = recognizer.with_scratch_dir(dir);
            }
            Arc::new(recognizer)
        }
    };

    tracing::debug!(backend = recognizer.name(), "Entity recognizer initialized");
    Ok(Some(recognizer))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Recognizer returning canned entities, optionally failing on chunks
    /// that contain a marker string
    pub struct ScriptedRecognizer {
        pub entities: Vec<(String, String)>,
        pub fail_on: Option<String>,
        pub calls: AtomicUsize,
    }

    impl ScriptedRecognizer {
        pub fn new(entities: &[(&str, &str)]) -> Self {
            Self {
                entities: entities
                    .iter()
                    .map(|(l, t)| (l.to_string(), t.to_string()))
                    .collect(),
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing_on(mut self, marker: &str) -> Self {
            self.fail_on = Some(marker.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EntityRecognizer for ScriptedRecognizer {
        fn name(&self) -> &str {
            "scripted"
        }

        fn recognize(&self, chunk: &str) -> anyhow::Result<Vec<RecognizedEntity>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = &self.fail_on {
                if chunk.contains(marker.as_str()) {
                    anyhow::bail!("scripted failure");
                }
            }
            Ok(self
                .entities
                .iter()
                .flat_map(|(label, text)| {
                    chunk
                        .match_indices(text.as_str())
                        .map(|(start, m)| RecognizedEntity::new(label, m, start, start + m.len()))
                        .collect::<Vec<_>>()
                })
                .collect())
        }
    }
}

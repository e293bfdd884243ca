//! PHI processing engine
//!
//! [`PhiEngine`] wires the scanners, aggregator, text transformer, page
//! redactor and audit logger together for one request at a time.
//!
//! # Architecture
//!
//! - **Scanners**: pattern rules, entity recognition and context-triggered
//!   recognition run concurrently on the blocking pool
//! - **Aggregator**: merges the three outputs once all of them have finished
//! - **Transformer / Redactor**: rewrite plain text or paint page overlays
//! - **Audit Logger**: records each request with hashed finding values
//!
//! # Examples
//!
//! ```no_run
//! use phiguard::config::PhiGuardConfig;
//! use phiguard::phi::{HandlingPolicy, PhiEngine, ProcessedArtifact};
//!
//! # async fn example() -> phiguard::domain::Result<()> {
//! let engine = PhiEngine::from_config(&PhiGuardConfig::default())?;
//! engine.warm_up()?;
//!
//! let outcome = engine
//!     .process_text("note.txt", "SSN: 123-45-6789", HandlingPolicy::Redact)
//!     .await?;
//! if let ProcessedArtifact::Text(text) = outcome.artifact {
//!     assert_eq!(text, "SSN: [REDACTED]");
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::PhiGuardConfig;
use crate::domain::{PhiError, Result};
use crate::phi::aggregate::aggregate;
use crate::phi::audit::{AuditLogger, AuditRecord};
use crate::phi::detector::patterns::PatternRegistry;
use crate::phi::detector::{
    ContextScanner, EntityLabelMap, EntityScanner, PatternScanner, PhiScanner, RecognizerRuntime,
};
use crate::phi::models::{FindingsMap, HandlingPolicy};
use crate::phi::redactor::{PageRedactor, PageWords, RedactedDocument};
use crate::phi::transform::TextTransformer;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Output artifact of a processed request
#[derive(Debug, Clone)]
pub enum ProcessedArtifact {
    /// Rewritten plain text
    Text(String),
    /// Visually redacted paginated document
    Paginated(RedactedDocument),
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub request_id: Uuid,
    pub policy: HandlingPolicy,
    pub findings: FindingsMap,
    pub artifact: ProcessedArtifact,
    pub processing_time_ms: u64,
}

/// Main PHI engine
///
/// The engine holds no per-request state and can be shared across tasks
/// with `Arc`. The recognizer runtime is shared by the entity and context
/// scanners and initialized at most once.
pub struct PhiEngine {
    pattern: Arc<PatternScanner>,
    entity: Arc<EntityScanner>,
    context: Arc<ContextScanner>,
    runtime: Arc<RecognizerRuntime>,
    transformer: TextTransformer,
    redactor: PageRedactor,
    audit_logger: Option<AuditLogger>,
    default_policy: HandlingPolicy,
}

impl PhiEngine {
    /// Create an engine with a recognizer runtime built from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the pattern
    /// library cannot be loaded, or the audit log cannot be created.
    /// Recognizer initialization is deferred; see [`warm_up`](Self::warm_up).
    pub fn from_config(config: &PhiGuardConfig) -> Result<Self> {
        let runtime = Arc::new(RecognizerRuntime::new(config.recognizer.clone()));
        Self::with_runtime(config, runtime)
    }

    /// Create an engine sharing an existing recognizer runtime
    pub fn with_runtime(config: &PhiGuardConfig, runtime: Arc<RecognizerRuntime>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PhiError::Configuration(format!("Invalid configuration: {}", e)))?;

        let pattern = match config.scanner.pattern_library {
            Some(ref path) => PatternScanner::with_registry(PatternRegistry::from_file(path)?),
            None => PatternScanner::new()?,
        };

        let label_map = EntityLabelMap::with_overrides(&config.recognizer.label_map);
        let entity = EntityScanner::new(runtime.clone())?
            .with_chunk_size(config.scanner.chunk_size)
            .with_name_window(config.scanner.name_context_window)
            .with_label_map(label_map.clone());
        let context = ContextScanner::with_triggers(runtime.clone(), &config.scanner.context_triggers)
            .with_label_map(label_map);

        let redaction = &config.redaction;
        let transformer = TextTransformer::new()
            .with_marker(redaction.marker.clone())
            .with_token_mode(redaction.token_mode, redaction.fixed_token_length);
        let redactor = PageRedactor::new()
            .with_marker(redaction.marker.clone())
            .with_padding(redaction.box_padding)
            .with_min_match_length(redaction.min_match_length)
            .with_token_mode(redaction.token_mode, redaction.fixed_token_length);

        let audit_logger = if config.audit.enabled {
            let mut logger = AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )
            .map_err(|e| PhiError::Configuration(format!("{e:#}")))?;
            match &config.audit.hash_salt {
                Some(salt) => logger = logger.with_salt(salt.clone()),
                None => tracing::warn!(
                    "audit.hash_salt is not set; audit digests of short values can be brute-forced"
                ),
            }
            Some(logger)
        } else {
            None
        };

        tracing::debug!(
            rules = pattern.registry().all_patterns().len(),
            triggers = context.trigger_count(),
            backend = ?runtime.backend(),
            audit = audit_logger.is_some(),
            "PHI engine created"
        );

        Ok(Self {
            pattern: Arc::new(pattern),
            entity: Arc::new(entity),
            context: Arc::new(context),
            runtime,
            transformer,
            redactor,
            audit_logger,
            default_policy: redaction.policy,
        })
    }

    /// Initialize the entity recognizer now instead of on the first request
    ///
    /// # Errors
    ///
    /// [`PhiError::ModelUnavailable`] if the backend cannot be initialized.
    pub fn warm_up(&self) -> Result<()> {
        self.runtime.warm_up()
    }

    /// Shared recognizer runtime
    pub fn runtime(&self) -> &Arc<RecognizerRuntime> {
        &self.runtime
    }

    /// Policy applied when a request does not select one
    pub fn default_policy(&self) -> HandlingPolicy {
        self.default_policy
    }

    /// Run all three scanners and aggregate their findings
    ///
    /// The scanners run concurrently; aggregation waits for all of them.
    /// A scanner that fails structurally (for example an unavailable
    /// recognizer) fails the whole detection and no partial map is returned.
    pub async fn detect(&self, text: &str) -> Result<FindingsMap> {
        let text: Arc<str> = Arc::from(text);
        let started = Instant::now();

        let (patterns, entities, context) = tokio::try_join!(
            run_scanner(self.pattern.clone(), text.clone()),
            run_scanner(self.entity.clone(), text.clone()),
            run_scanner(self.context.clone(), text.clone()),
        )?;

        let findings = aggregate([patterns, entities, context]);
        tracing::info!(
            chars = text.chars().count(),
            categories = findings.category_count(),
            findings = findings.total_findings(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "PHI detection complete"
        );
        Ok(findings)
    }

    /// Rewrite text with already-detected findings
    pub fn transform_text(
        &self,
        text: &str,
        findings: &FindingsMap,
        policy: HandlingPolicy,
    ) -> Result<String> {
        self.transformer.transform(text, findings, policy)
    }

    /// Redact a paginated document with already-detected findings
    pub fn redact_pages(
        &self,
        source: &[u8],
        pages: &[PageWords],
        findings: &FindingsMap,
        policy: HandlingPolicy,
    ) -> Result<RedactedDocument> {
        self.redactor.redact(source, pages, findings, policy)
    }

    /// Detect and transform a plain-text document
    pub async fn process_text(
        &self,
        document: &str,
        text: &str,
        policy: HandlingPolicy,
    ) -> Result<ProcessOutcome> {
        let started = Instant::now();
        let findings = self.detect(text).await?;
        let output = self.transform_text(text, &findings, policy)?;
        self.finish(document, policy, findings, ProcessedArtifact::Text(output), started)
    }

    /// Detect and visually redact a paginated document
    ///
    /// Detection runs over the text of every page; `pages` must describe
    /// every page of `source`, in order.
    pub async fn process_pages(
        &self,
        document: &str,
        source: &[u8],
        pages: &[PageWords],
        policy: HandlingPolicy,
    ) -> Result<ProcessOutcome> {
        let started = Instant::now();
        let text = pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let findings = self.detect(&text).await?;
        let redacted = self.redact_pages(source, pages, &findings, policy)?;
        self.finish(
            document,
            policy,
            findings,
            ProcessedArtifact::Paginated(redacted),
            started,
        )
    }

    fn finish(
        &self,
        document: &str,
        policy: HandlingPolicy,
        findings: FindingsMap,
        artifact: ProcessedArtifact,
        started: Instant,
    ) -> Result<ProcessOutcome> {
        let request_id = Uuid::new_v4();
        let processing_time_ms = started.elapsed().as_millis() as u64;
        let redactions = match &artifact {
            ProcessedArtifact::Paginated(doc) => Some(doc.total_redactions()),
            ProcessedArtifact::Text(_) => None,
        };

        if let Some(ref logger) = self.audit_logger {
            logger
                .log_request(&AuditRecord {
                    request_id,
                    timestamp: Utc::now(),
                    document,
                    policy,
                    findings: &findings,
                    redactions,
                    processing_time_ms,
                })
                .map_err(|e| PhiError::Io(format!("Failed to write audit entry: {e:#}")))?;
        }

        tracing::info!(
            request_id = %request_id,
            policy = %policy,
            findings = findings.total_findings(),
            redactions,
            processing_time_ms,
            "Document processed"
        );

        Ok(ProcessOutcome {
            request_id,
            policy,
            findings,
            artifact,
            processing_time_ms,
        })
    }
}

/// Run one scanner on the blocking pool
async fn run_scanner<S>(scanner: Arc<S>, text: Arc<str>) -> Result<FindingsMap>
where
    S: PhiScanner + 'static,
{
    let name = scanner.name().to_string();
    let findings = tokio::task::spawn_blocking(move || scanner.scan(&text))
        .await
        .map_err(|e| PhiError::ScanFailure(format!("{name} scanner task failed: {e}")))??;

    tracing::debug!(
        scanner = %name,
        findings = findings.total_findings(),
        "Scanner finished"
    );
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RecognizerBackend, RecognizerConfig};
    use crate::phi::detector::recognizer::testing::ScriptedRecognizer;
    use crate::phi::models::PhiCategory;
    use tempfile::tempdir;

    fn engine() -> PhiEngine {
        PhiEngine::from_config(&PhiGuardConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_detect_combines_all_scanners() {
        let text = "PATIENT INFORMATION\nName: Maria Lopez\nSSN: 123-45-6789\nSeen at Mercy General Hospital";
        let findings = engine().detect(text).await.unwrap();

        assert!(findings.contains(&PhiCategory::Ssn, "123-45-6789"));
        assert!(findings.contains(&PhiCategory::Name, "Maria Lopez"));
        assert!(findings.contains(&PhiCategory::Organization, "Mercy General Hospital"));
    }

    #[tokio::test]
    async fn test_detection_is_repeatable() {
        let engine = engine();
        let text = "Contact test@example.com or 555-123-4567. Dr. Grey reviewed.";
        let first = engine.detect(text).await.unwrap();
        let second = engine.detect(text).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_process_text_redacts() {
        let outcome = engine()
            .process_text(
                "note.txt",
                "SSN: 123-45-6789, contact test@example.com",
                HandlingPolicy::Redact,
            )
            .await
            .unwrap();

        match outcome.artifact {
            ProcessedArtifact::Text(text) => {
                assert_eq!(text, "SSN: [REDACTED], contact [REDACTED]")
            }
            other => panic!("unexpected artifact: {other:?}"),
        }
        assert_eq!(outcome.policy, HandlingPolicy::Redact);
    }

    #[tokio::test]
    async fn test_unavailable_recognizer_fails_detection() {
        let mut config = PhiGuardConfig::default();
        config.recognizer = RecognizerConfig {
            backend: RecognizerBackend::Command,
            command: vec!["phiguard-no-such-recognizer".to_string()],
            ..RecognizerConfig::default()
        };
        let engine = PhiEngine::from_config(&config).unwrap();

        assert!(matches!(engine.warm_up(), Err(PhiError::ModelUnavailable(_))));
        let err = engine.detect("Dr. Smith").await.unwrap_err();
        assert_eq!(err.kind(), "model_unavailable");
    }

    #[tokio::test]
    async fn test_shared_runtime_with_injected_recognizer() {
        let recognizer = Arc::new(ScriptedRecognizer::new(&[("PERSON", "Alice")]));
        let runtime = Arc::new(RecognizerRuntime::with_recognizer(recognizer.clone()));
        let engine = PhiEngine::with_runtime(&PhiGuardConfig::default(), runtime).unwrap();

        let findings = engine.detect("Alice called").await.unwrap();
        assert!(findings.contains(&PhiCategory::Name, "Alice"));
        // One chunk for the entity scanner, no context headers
        assert_eq!(recognizer.calls(), 1);
    }

    #[tokio::test]
    async fn test_audit_entry_written() {
        let dir = tempdir().unwrap();
        let mut config = PhiGuardConfig::default();
        config.audit.enabled = true;
        config.audit.log_path = dir.path().join("audit.log");
        let engine = PhiEngine::from_config(&config).unwrap();

        engine
            .process_text("note.txt", "SSN: 123-45-6789", HandlingPolicy::Remove)
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        assert!(content.contains("\"policy\":\"remove\""));
        assert!(!content.contains("123-45-6789"));
    }

    #[tokio::test]
    async fn test_audit_uses_configured_salt() {
        let dir = tempdir().unwrap();
        let mut config = PhiGuardConfig::default();
        config.audit.enabled = true;
        config.audit.log_path = dir.path().join("audit.log");
        config.audit.hash_salt = Some("ward-7".to_string());
        let engine = PhiEngine::from_config(&config).unwrap();

        engine
            .process_text("jane_doe_discharge.txt", "SSN: 123-45-6789", HandlingPolicy::Redact)
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
        assert!(!content.contains("jane_doe"));
        assert!(content.contains(&crate::phi::audit::salted_hash(Some("ward-7"), "123-45-6789")));
    }
}

//! End-to-end text handling: detection followed by each policy

use phiguard::config::PhiGuardConfig;
use phiguard::domain::PhiError;
use phiguard::phi::transform::parse_policy;
use phiguard::phi::{
    FindingsMap, HandlingPolicy, PhiCategory, PhiEngine, ProcessedArtifact, TextTransformer,
};

fn engine() -> PhiEngine {
    PhiEngine::from_config(&PhiGuardConfig::default()).expect("default engine")
}

async fn process(text: &str, policy: HandlingPolicy) -> String {
    let outcome = engine()
        .process_text("note.txt", text, policy)
        .await
        .expect("processing succeeds");
    match outcome.artifact {
        ProcessedArtifact::Text(text) => text,
        other => panic!("expected text artifact, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redact_replaces_ssn_and_email() {
    let output = process(
        "SSN: 123-45-6789, contact test@example.com",
        HandlingPolicy::Redact,
    )
    .await;
    assert!(output.contains("SSN: [REDACTED], contact [REDACTED]"));
}

#[tokio::test]
async fn test_remove_blanks_visit_date() {
    let input = "Visit Date: 01/02/2023";
    let output = process(input, HandlingPolicy::Remove).await;

    assert_eq!(output, format!("Visit Date: {}", " ".repeat(10)));
    assert_eq!(output.chars().count(), input.chars().count());
}

#[test]
fn test_unknown_policy_rejected_before_output() {
    let err = parse_policy("shred").unwrap_err();
    assert!(matches!(err, PhiError::UnsupportedPolicy(ref p) if p == "shred"));

    let mut findings = FindingsMap::new();
    findings.insert(PhiCategory::Ssn, "123-45-6789");
    let result = TextTransformer::new().transform_with_policy("SSN: 123-45-6789", &findings, "shred");
    assert!(result.is_err());
}

#[tokio::test]
async fn test_tokenize_is_consistent_within_request() {
    let output = process(
        "Email test@example.com twice: test@example.com",
        HandlingPolicy::Tokenize,
    )
    .await;

    assert!(!output.contains("test@example.com"));
    let prefix = "Email ";
    let token = &output[prefix.len()..prefix.len() + "test@example.com".len()];
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(output.ends_with(&format!("twice: {token}")));
}

#[tokio::test]
async fn test_text_without_phi_is_unchanged() {
    let input = "Blood pressure within normal limits.";
    assert_eq!(process(input, HandlingPolicy::Redact).await, input);
}

#[tokio::test]
async fn test_remove_preserves_length_for_every_finding() {
    let input = "Contact test@example.com or 555-123-4567 about 123-45-6789.";
    let output = process(input, HandlingPolicy::Remove).await;

    assert_eq!(output.chars().count(), input.chars().count());
    assert!(!output.contains("test@example.com"));
    assert!(!output.contains("555-123-4567"));
    assert!(!output.contains("123-45-6789"));
}

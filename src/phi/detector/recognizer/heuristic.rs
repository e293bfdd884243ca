//! Built-in rule-based entity recognizer

use super::{EntityRecognizer, RecognizedEntity};
use crate::domain::Result;
use regex::Regex;
use std::collections::HashSet;

const US_STATE_CODES: &str = "A[KLRZ]|C[AOT]|D[CE]|FL|GA|HI|I[ADLN]|K[SY]|LA|M[ADEINOST]|N[CDEHJMVY]|O[HKR]|PA|RI|S[CD]|T[NX]|UT|V[AT]|W[AIVY]";

/// Recognizes persons, organisations, places and facilities with
/// capitalisation and keyword rules
///
/// Emits the same label vocabulary as a statistical recognizer (`PERSON`,
/// `ORG`, `GPE`, `FAC`) so it can stand in for one. Recall is modest and
/// false positives on capitalised phrases are expected.
pub struct HeuristicRecognizer {
    rules: Vec<(&'static str, Regex)>,
}

impl HeuristicRecognizer {
    /// Compile the rule set
    pub fn new() -> Result<Self> {
        let rules = vec![
            (
                "PERSON",
                Regex::new(
                    r"\b(?:Dr\.|Mr\.|Mrs\.|Ms\.|Miss|Prof\.|Professor)[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z]+)?)",
                )?,
            ),
            (
                "PERSON",
                Regex::new(
                    r"(?i:patient name|patient|name|guardian|emergency contact|spouse|mother|father)[ \t]*:[ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z]\.)?(?:[ \t]+[A-Z][a-z'-]+){1,2})",
                )?,
            ),
            (
                "ORG",
                Regex::new(
                    r"\b((?:[A-Z][A-Za-z'&.-]*[ \t]+){1,4}(?:Hospital|Clinic|Medical Center|Healthcare|Health|Pharmacy|University|Inc|LLC|Corporation))\b",
                )?,
            ),
            (
                "GPE",
                Regex::new(&format!(
                    r"\b((?:[A-Z][a-z]+[ \t]+)?[A-Z][a-z]+,[ \t]+(?:{US_STATE_CODES}))\b"
                ))?,
            ),
            (
                "FAC",
                Regex::new(
                    r"\b((?:[A-Z][a-z]+[ \t]+){1,3}(?:Pavilion|Wing|Nursing Home|Hospice|Care Center|Rehabilitation Center))\b",
                )?,
            ),
        ];

        Ok(Self { rules })
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn recognize(&self, chunk: &str) -> anyhow::Result<Vec<RecognizedEntity>> {
        let mut seen = HashSet::new();
        let mut entities = Vec::new();

        for (label, regex) in &self.rules {
            for caps in regex.captures_iter(chunk) {
                let Some(span) = caps.get(1) else { continue };
                if seen.insert((*label, span.start(), span.end())) {
                    entities.push(RecognizedEntity::new(
                        *label,
                        span.as_str(),
                        span.start(),
                        span.end(),
                    ));
                }
            }
        }

        entities.sort_by_key(|e| (e.start, e.end));
        Ok(entities)
    }
}

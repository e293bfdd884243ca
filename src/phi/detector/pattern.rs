//! Regex-based PHI scanner

use super::{patterns::PatternRegistry, PhiScanner};
use crate::domain::Result;
use crate::phi::models::FindingsMap;
use std::sync::Arc;

/// Applies every rule of a [`PatternRegistry`] to the full text
///
/// Breadth of recall is the goal; overlapping or imprecise matches are
/// expected and left to the aggregator and transformer.
pub struct PatternScanner {
    pattern_registry: Arc<PatternRegistry>,
}

impl PatternScanner {
    /// Create a new scanner with the built-in rules
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new scanner with a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
        }
    }

    /// Registry backing this scanner
    pub fn registry(&self) -> &PatternRegistry {
        &self.pattern_registry
    }
}

impl PhiScanner for PatternScanner {
    fn name(&self) -> &str {
        "pattern"
    }

    fn scan(&self, text: &str) -> Result<FindingsMap> {
        let mut findings = FindingsMap::new();

        for (category, patterns) in self.pattern_registry.by_category() {
            let mut matched = 0usize;
            for pattern in patterns {
                for value in pattern.find_all(text) {
                    findings.insert(category.clone(), value);
                    matched += 1;
                }
            }
            if matched > 0 {
                tracing::trace!(category = %category, matches = matched, "Pattern matches");
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::models::PhiCategory;

    fn scan(text: &str) -> FindingsMap {
        PatternScanner::new().unwrap().scan(text).unwrap()
    }

    #[test]
    fn test_detect_ssn_and_email() {
        let findings = scan("SSN: 123-45-6789, contact test@example.com");
        assert!(findings.contains(&PhiCategory::Ssn, "123-45-6789"));
        assert!(findings.contains(&PhiCategory::Email, "test@example.com"));
        assert_eq!(findings.total_findings(), 2);
    }

    #[test]
    fn test_detect_phone() {
        let findings = scan("Call (555) 123-4567");
        assert!(findings.contains(&PhiCategory::Phone, "(555) 123-4567"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let findings = scan("a@b.io then a@b.io again and a@b.io");
        assert_eq!(findings.get(&PhiCategory::Email).unwrap().len(), 1);
    }

    #[test]
    fn test_visit_date_records_date_only() {
        let findings = scan("Visit Date: 01/02/2023");
        assert!(findings.contains(&PhiCategory::VisitDate, "01/02/2023"));
        assert!(!findings.contains(&PhiCategory::VisitDate, "Visit Date: 01/02/2023"));
    }

    #[test]
    fn test_labelled_identifiers() {
        let text = "MRN: A1234567\nMember ID: XKC-99812\nDevice Serial No. SN-55821\nAccount #: 0042-7781";
        let findings = scan(text);
        assert!(findings.contains(&PhiCategory::MedicalRecordNumber, "A1234567"));
        assert!(findings.contains(&PhiCategory::InsuranceId, "XKC-99812"));
        assert!(findings.contains(&PhiCategory::DeviceId, "SN-55821"));
        assert!(findings.contains(&PhiCategory::AccountNumber, "0042-7781"));
    }

    #[test]
    fn test_address_and_provider() {
        let findings = scan("Seen by Dr. Gregory House at 221 Baker Street, 90210");
        assert!(findings.contains(&PhiCategory::ProviderName, "Gregory House"));
        assert!(findings.contains(&PhiCategory::StreetAddress, "221 Baker Street"));
        assert!(findings.contains(&PhiCategory::PostalCode, "90210"));
    }

    #[test]
    fn test_postal_code_rule_is_imprecise() {
        // Any standalone 5-digit number is reported
        let findings = scan("Lot 48213 shipped");
        assert!(findings.contains(&PhiCategory::PostalCode, "48213"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "DOB: 04/12/1975, phone 555-867-5309, jane@clinic.org";
        assert_eq!(scan(text), scan(text));
    }
}

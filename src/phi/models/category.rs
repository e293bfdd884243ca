//! PHI categories and the category registration table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of sensitive data a finding belongs to
///
/// Built-in categories cover the detection rules and the default entity
/// label table. [`PhiCategory::Custom`] is the extension point for
/// categories introduced by recognizer label maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PhiCategory {
    /// Social Security Numbers
    Ssn,
    /// Email addresses
    Email,
    /// Telephone numbers
    Phone,
    /// Dates of birth
    DateOfBirth,
    /// Payment card numbers
    CreditCard,
    /// Postal codes
    PostalCode,
    /// Street addresses
    StreetAddress,
    /// Medical Record Numbers
    MedicalRecordNumber,
    /// Insurance member/policy identifiers
    InsuranceId,
    /// Device identifiers and serial numbers
    DeviceId,
    /// Account numbers
    AccountNumber,
    /// Visit/encounter dates
    VisitDate,
    /// Treating provider names
    ProviderName,
    /// Person names
    Name,
    /// Geo-political entities and locations
    Location,
    /// Organizations
    Organization,
    /// Facilities (hospitals, clinics, buildings)
    Facility,
    /// Nationality, religious or political group
    Demographic,
    /// Named events
    Event,
    /// Category introduced through a registration table entry
    Custom(String),
}

impl PhiCategory {
    /// All built-in categories
    pub const BUILTIN: [PhiCategory; 19] = [
        Self::Ssn,
        Self::Email,
        Self::Phone,
        Self::DateOfBirth,
        Self::CreditCard,
        Self::PostalCode,
        Self::StreetAddress,
        Self::MedicalRecordNumber,
        Self::InsuranceId,
        Self::DeviceId,
        Self::AccountNumber,
        Self::VisitDate,
        Self::ProviderName,
        Self::Name,
        Self::Location,
        Self::Organization,
        Self::Facility,
        Self::Demographic,
        Self::Event,
    ];

    /// Canonical label for the category
    pub fn label(&self) -> &str {
        match self {
            Self::Ssn => "SSN",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::DateOfBirth => "DOB",
            Self::CreditCard => "CREDIT_CARD",
            Self::PostalCode => "ZIP_CODE",
            Self::StreetAddress => "ADDRESS",
            Self::MedicalRecordNumber => "MRN",
            Self::InsuranceId => "INSURANCE_ID",
            Self::DeviceId => "DEVICE_ID",
            Self::AccountNumber => "ACCOUNT_NUMBER",
            Self::VisitDate => "VISIT_DATE",
            Self::ProviderName => "PROVIDER_NAME",
            Self::Name => "NAME",
            Self::Location => "LOCATION",
            Self::Organization => "ORGANIZATION",
            Self::Facility => "FACILITY",
            Self::Demographic => "DEMOGRAPHIC",
            Self::Event => "EVENT",
            Self::Custom(label) => label,
        }
    }

    /// Whether this category is part of the built-in set
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<PhiCategory> for String {
    fn from(category: PhiCategory) -> Self {
        category.label().to_string()
    }
}

impl From<String> for PhiCategory {
    fn from(label: String) -> Self {
        CategoryRegistry::builtin().resolve_open(&label)
    }
}

/// Registration table mapping labels and aliases to categories
///
/// Detection rules resolve their category with [`resolve`](Self::resolve),
/// which only accepts registered labels. Recognizer label maps use
/// [`resolve_open`](Self::resolve_open), which mints a
/// [`PhiCategory::Custom`] for anything unregistered.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: HashMap<String, PhiCategory>,
}

impl CategoryRegistry {
    /// Registry with every built-in label plus the common aliases
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };

        for category in PhiCategory::BUILTIN {
            registry.register(category.label(), category.clone());
        }

        let aliases = [
            ("SOCIAL_SECURITY_NUMBER", PhiCategory::Ssn),
            ("DATE_OF_BIRTH", PhiCategory::DateOfBirth),
            ("POSTAL_CODE", PhiCategory::PostalCode),
            ("ZIP", PhiCategory::PostalCode),
            ("STREET_ADDRESS", PhiCategory::StreetAddress),
            ("MEDICAL_RECORD_NUMBER", PhiCategory::MedicalRecordNumber),
            ("INSURANCE", PhiCategory::InsuranceId),
            ("HEALTH_PLAN", PhiCategory::InsuranceId),
            ("DEVICE", PhiCategory::DeviceId),
            ("ACCOUNT", PhiCategory::AccountNumber),
            ("PROVIDER", PhiCategory::ProviderName),
            ("PERSON", PhiCategory::Name),
            ("GEOGRAPHIC_LOCATION", PhiCategory::Location),
        ];
        for (alias, category) in aliases {
            registry.register(alias, category);
        }

        registry
    }

    /// Register a label (case-insensitive) for a category
    pub fn register(&mut self, label: &str, category: PhiCategory) {
        self.entries.insert(normalize_label(label), category);
    }

    /// Resolve a registered label; `None` for unknown labels
    pub fn resolve(&self, label: &str) -> Option<PhiCategory> {
        let normalized = normalize_label(label);
        let key = normalized.strip_prefix("PHI_").unwrap_or(&normalized);
        self.entries.get(key).cloned()
    }

    /// Resolve a label, creating a custom category when it is unregistered
    pub fn resolve_open(&self, label: &str) -> PhiCategory {
        self.resolve(label)
            .unwrap_or_else(|| PhiCategory::Custom(normalize_label(label)))
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase().replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_labels_round_trip() {
        let registry = CategoryRegistry::builtin();
        for category in PhiCategory::BUILTIN {
            assert_eq!(registry.resolve(category.label()), Some(category));
        }
    }

    #[test]
    fn test_resolve_aliases_and_prefix() {
        let registry = CategoryRegistry::builtin();
        assert_eq!(registry.resolve("person"), Some(PhiCategory::Name));
        assert_eq!(registry.resolve("PHI_SSN"), Some(PhiCategory::Ssn));
        assert_eq!(
            registry.resolve("medical record number"),
            Some(PhiCategory::MedicalRecordNumber)
        );
    }

    #[test]
    fn test_closed_resolution_rejects_unknown() {
        let registry = CategoryRegistry::builtin();
        assert_eq!(registry.resolve("FAVORITE_COLOR"), None);
    }

    #[test]
    fn test_open_resolution_creates_custom() {
        let registry = CategoryRegistry::builtin();
        let category = registry.resolve_open("work of art");
        assert_eq!(category, PhiCategory::Custom("WORK_OF_ART".to_string()));
        assert!(!category.is_builtin());
    }

    #[test]
    fn test_register_extends_table() {
        let mut registry = CategoryRegistry::builtin();
        registry.register("NPI", PhiCategory::Custom("NPI".to_string()));
        assert_eq!(
            registry.resolve("npi"),
            Some(PhiCategory::Custom("NPI".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&PhiCategory::MedicalRecordNumber).unwrap();
        assert_eq!(json, "\"MRN\"");
        let parsed: PhiCategory = serde_json::from_str("\"EMAIL\"").unwrap();
        assert_eq!(parsed, PhiCategory::Email);
    }
}

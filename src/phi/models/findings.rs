//! Findings map: deduplicated PHI substrings grouped by category

use super::category::PhiCategory;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Deduplicated collection of findings grouped by category
///
/// Substrings are compared by exact equality within a category; no case or
/// whitespace normalization is applied. A category may be present with an
/// empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingsMap {
    entries: BTreeMap<PhiCategory, BTreeSet<String>>,
}

impl FindingsMap {
    /// Create an empty findings map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding. Empty substrings are ignored.
    ///
    /// Returns `true` if the substring was not already present in the category.
    pub fn insert(&mut self, category: PhiCategory, value: impl Into<String>) -> bool {
        let value = value.into();
        let set = self.entries.entry(category).or_default();
        if value.is_empty() {
            return false;
        }
        set.insert(value)
    }

    /// Make sure a category is present, even without findings
    pub fn ensure_category(&mut self, category: PhiCategory) {
        self.entries.entry(category).or_default();
    }

    /// Union another map into this one
    pub fn merge(&mut self, other: FindingsMap) {
        for (category, values) in other.entries {
            self.entries.entry(category).or_default().extend(values);
        }
    }

    /// Substrings recorded for a category
    pub fn get(&self, category: &PhiCategory) -> Option<&BTreeSet<String>> {
        self.entries.get(category)
    }

    /// Whether a category contains the given substring
    pub fn contains(&self, category: &PhiCategory, value: &str) -> bool {
        self.entries
            .get(category)
            .is_some_and(|values| values.contains(value))
    }

    /// Categories present in the map
    pub fn categories(&self) -> impl Iterator<Item = &PhiCategory> {
        self.entries.keys()
    }

    /// Iterate `(category, substrings)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&PhiCategory, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Number of categories present
    pub fn category_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of `(category, substring)` findings
    pub fn total_findings(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// True when no category holds any substring
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeSet::is_empty)
    }

    /// Distinct substrings across all categories, longest first
    ///
    /// Length is measured in characters; ties are broken lexicographically so
    /// the order is fully deterministic.
    pub fn substrings_longest_first(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self
            .entries
            .values()
            .flat_map(|values| values.iter().map(String::as_str))
            .collect();

        let mut ordered: Vec<&str> = unique.into_iter().collect();
        ordered.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        ordered
    }
}

impl FromIterator<(PhiCategory, String)> for FindingsMap {
    fn from_iter<I: IntoIterator<Item = (PhiCategory, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (category, value) in iter {
            map.insert(category, value);
        }
        map
    }
}

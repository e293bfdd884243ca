//! Pattern library for PHI detection

use crate::domain::{PhiError, Result};
use crate::phi::models::{CategoryRegistry, PhiCategory};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Rule definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this rule
    pub patterns: Vec<String>,
    /// PHI category label
    pub category: String,
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Name of the rule this pattern belongs to
    pub rule: String,
    /// Compiled regex
    pub regex: Regex,
    /// PHI category
    pub category: PhiCategory,
}

impl CompiledPattern {
    /// Matched substrings in `text`: capture group 1 when the pattern has
    /// one and it participated, the whole match otherwise.
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let has_group = self.regex.captures_len() > 1;
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let matched = if has_group {
                    caps.get(1).or_else(|| caps.get(0))
                } else {
                    caps.get(0)
                };
                matched.map(|m| m.as_str())
            })
            .collect()
    }
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Registry of named detection rules
///
/// Malformed rules (unknown category, invalid regex) are logged and skipped
/// while loading; they never prevent the remaining rules from loading.
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_category: HashMap<PhiCategory, Vec<CompiledPattern>>,
    skipped: Vec<String>,
}

impl PatternRegistry {
    /// Create a pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PhiError::Pattern(format!(
                "Failed to read pattern library {}: {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary = toml::from_str(content)
            .map_err(|e| PhiError::Pattern(format!("Failed to parse pattern library TOML: {e}")))?;

        let categories = CategoryRegistry::builtin();
        let mut registry = Self {
            patterns: Vec::new(),
            patterns_by_category: HashMap::new(),
            skipped: Vec::new(),
        };

        for (name, def) in library.patterns {
            let Some(category) = categories.resolve(&def.category) else {
                tracing::warn!(
                    rule = %name,
                    category = %def.category,
                    "Skipping detection rule with unregistered category"
                );
                registry.skipped.push(name);
                continue;
            };

            for (idx, pattern_str) in def.patterns.iter().enumerate() {
                match Regex::new(pattern_str) {
                    Ok(regex) => registry.push(CompiledPattern {
                        rule: name.clone(),
                        regex,
                        category: category.clone(),
                    }),
                    Err(e) => {
                        tracing::warn!(
                            rule = %name,
                            pattern_index = idx,
                            error = %e,
                            "Skipping malformed detection pattern"
                        );
                        registry.skipped.push(format!("{name}[{idx}]"));
                    }
                }
            }
        }

        Ok(registry)
    }

    /// Create the default registry from the embedded rule set
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/phi_patterns.toml");
        Self::from_toml(default_toml)
    }

    fn push(&mut self, compiled: CompiledPattern) {
        self.patterns_by_category
            .entry(compiled.category.clone())
            .or_default()
            .push(compiled.clone());
        self.patterns.push(compiled);
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific category
    pub fn patterns_for_category(&self, category: &PhiCategory) -> Option<&[CompiledPattern]> {
        self.patterns_by_category
            .get(category)
            .map(|v| v.as_slice())
    }

    /// Iterate categories with their patterns
    pub fn by_category(&self) -> impl Iterator<Item = (&PhiCategory, &[CompiledPattern])> {
        self.patterns_by_category
            .iter()
            .map(|(category, patterns)| (category, patterns.as_slice()))
    }

    /// Rules (or `rule[index]` patterns) that were skipped while loading
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

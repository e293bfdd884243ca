//! Scan reporting
//!
//! Summarises what a scan found without transforming anything. Values are
//! omitted unless explicitly requested.

use crate::phi::models::FindingsMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Longest value shown in a console report
const MAX_VALUE_CHARS: usize = 50;

/// Findings summary for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Document name
    pub document: String,

    /// Extracted text length in characters
    pub text_length: usize,

    /// Pages, for paginated documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,

    /// Total distinct findings
    pub total_findings: usize,

    /// Distinct findings by category label
    pub findings_by_category: BTreeMap<String, usize>,

    /// Finding values by category label, only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, Vec<String>>>,

    /// Notes about the scan (extraction placeholders, disabled recognizer)
    pub warnings: Vec<String>,

    /// Scan time in milliseconds
    pub scan_time_ms: u64,
}

impl ScanReport {
    /// Build a report from a findings map
    pub fn new(document: impl Into<String>, text_length: usize, findings: &FindingsMap) -> Self {
        let findings_by_category = findings
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(category, values)| (category.to_string(), values.len()))
            .collect();

        Self {
            document: document.into(),
            text_length,
            pages: None,
            total_findings: findings.total_findings(),
            findings_by_category,
            values: None,
            warnings: Vec::new(),
            scan_time_ms: 0,
        }
    }

    /// Record the page count
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Include finding values in the report
    pub fn with_values(mut self, findings: &FindingsMap) -> Self {
        self.values = Some(
            findings
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(category, values)| (category.to_string(), values.iter().cloned().collect()))
                .collect(),
        );
        self
    }

    /// Record the scan duration
    pub fn with_scan_time(mut self, scan_time_ms: u64) -> Self {
        self.scan_time_ms = scan_time_ms;
        self
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let rule = "───────────────────────────────────────────────────────────────\n";
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                        PHI SCAN REPORT                        \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("SUMMARY\n");
        output.push_str(rule);
        output.push_str(&format!("  Document:           {}\n", self.document));
        if let Some(pages) = self.pages {
            output.push_str(&format!("  Pages:              {}\n", pages));
        }
        output.push_str(&format!("  Text Length:        {} chars\n", self.text_length));
        output.push_str(&format!("  Total Findings:     {}\n", self.total_findings));
        output.push_str(&format!("  Scan Time:          {} ms\n", self.scan_time_ms));
        output.push('\n');

        if !self.findings_by_category.is_empty() {
            output.push_str("FINDINGS BY CATEGORY\n");
            output.push_str(rule);

            let mut categories: Vec<_> = self.findings_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

            for (category, count) in categories {
                output.push_str(&format!("  {:30} {:>5}\n", category, count));
                if let Some(values) = self.values.as_ref().and_then(|v| v.get(category)) {
                    for value in values {
                        output.push_str(&format!("      \"{}\"\n", truncate(value)));
                    }
                }
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("WARNINGS\n");
            output.push_str(rule);
            for warning in &self.warnings {
                output.push_str(&format!("  • {}\n", warning));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_VALUE_CHARS {
        let head: String = value.chars().take(MAX_VALUE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phi::models::PhiCategory;

    fn findings() -> FindingsMap {
        let mut map = FindingsMap::new();
        map.insert(PhiCategory::Ssn, "123-45-6789");
        map.insert(PhiCategory::Email, "a@example.com");
        map.insert(PhiCategory::Email, "b@example.com");
        map.ensure_category(PhiCategory::Phone);
        map
    }

    #[test]
    fn test_counts_by_category() {
        let report = ScanReport::new("note.txt", 120, &findings());
        assert_eq!(report.total_findings, 3);
        assert_eq!(report.findings_by_category.get("EMAIL"), Some(&2));
        assert_eq!(report.findings_by_category.get("SSN"), Some(&1));
        // Empty categories are not reported
        assert!(!report.findings_by_category.contains_key("PHONE"));
        assert!(report.values.is_none());
    }

    #[test]
    fn test_values_hidden_unless_requested() {
        let map = findings();
        let hidden = ScanReport::new("note.txt", 120, &map).format_json().unwrap();
        assert!(!hidden.contains("123-45-6789"));

        let shown = ScanReport::new("note.txt", 120, &map).with_values(&map);
        assert!(shown.format_console().contains("\"123-45-6789\""));
        assert!(shown.format_json().unwrap().contains("123-45-6789"));
    }

    #[test]
    fn test_format_console() {
        let mut report = ScanReport::new("scan.pdf", 2048, &findings())
            .with_pages(2)
            .with_scan_time(7);
        report.add_warning("Page 2 could not be read");

        let output = report.format_console();
        assert!(output.contains("PHI SCAN REPORT"));
        assert!(output.contains("Pages:              2"));
        assert!(output.contains("Total Findings:     3"));
        assert!(output.contains("Page 2 could not be read"));
    }

    #[test]
    fn test_truncate_long_values() {
        let long = "x".repeat(80);
        assert_eq!(truncate(&long).chars().count(), MAX_VALUE_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}

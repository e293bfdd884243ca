//! Plain-text transformation
//!
//! Rewrites text so that every occurrence of every finding is neutralized
//! according to a [`HandlingPolicy`].
//!
//! All distinct substrings are combined into a single alternation ordered
//! longest first and replaced in one left-to-right pass over the original
//! text. At any position the longest finding wins, so `"John Smith"` is
//! replaced as a whole even when `"John"` is also a finding, and replacement
//! output (markers, tokens) is never scanned again.

pub mod token;

pub use token::{TokenGenerator, TokenMode, TokenVault, DEFAULT_FIXED_TOKEN_LENGTH};

use crate::domain::Result;
use crate::phi::models::{FindingsMap, HandlingPolicy};
use regex::{Captures, RegexBuilder};

/// Default marker written by the `redact` policy
pub const DEFAULT_MARKER: &str = "[REDACTED]";

const ALTERNATION_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Per-policy replacement for a single matched substring
pub enum Replacement<'a> {
    /// Fixed marker regardless of length
    Marker(&'a str),
    /// Random alphanumeric token from the vault
    Token(TokenVault),
    /// Spaces, one per character
    Blank,
}

impl<'a> Replacement<'a> {
    /// Replacement text for `value`
    pub fn apply(&mut self, value: &str) -> String {
        match self {
            Replacement::Marker(marker) => (*marker).to_string(),
            Replacement::Token(vault) => vault.token_for(value),
            Replacement::Blank => " ".repeat(value.chars().count()),
        }
    }
}

/// Rewrites plain text per handling policy
#[derive(Debug, Clone)]
pub struct TextTransformer {
    marker: String,
    token_mode: TokenMode,
    fixed_token_length: usize,
}

impl TextTransformer {
    /// Create a transformer with the default marker and length-matched tokens
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            token_mode: TokenMode::MatchLength,
            fixed_token_length: DEFAULT_FIXED_TOKEN_LENGTH,
        }
    }

    /// Set the redaction marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set how token lengths are chosen
    pub fn with_token_mode(mut self, mode: TokenMode, fixed_length: usize) -> Self {
        self.token_mode = mode;
        self.fixed_token_length = fixed_length;
        self
    }

    /// Redaction marker
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Fresh token vault for one request
    pub fn token_vault(&self) -> TokenVault {
        TokenVault::new(self.token_mode, self.fixed_token_length)
    }

    /// Replacement for a policy, scoped to one request
    pub fn replacement(&self, policy: HandlingPolicy) -> Replacement<'_> {
        match policy {
            HandlingPolicy::Redact => Replacement::Marker(&self.marker),
            HandlingPolicy::Tokenize => Replacement::Token(self.token_vault()),
            HandlingPolicy::Remove => Replacement::Blank,
        }
    }

    /// Rewrite `text`, replacing every occurrence of every finding
    pub fn transform(&self, text: &str, findings: &FindingsMap, policy: HandlingPolicy) -> Result<String> {
        let substrings = findings.substrings_longest_first();
        if substrings.is_empty() {
            return Ok(text.to_string());
        }

        let mut replacement = self.replacement(policy);
        let alternation = substrings
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");

        let output = match RegexBuilder::new(&alternation)
            .size_limit(ALTERNATION_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => regex
                .replace_all(text, |caps: &Captures| replacement.apply(&caps[0]))
                .into_owned(),
            Err(e) => {
                tracing::warn!(
                    substrings = substrings.len(),
                    error = %e,
                    "Findings alternation too large; replacing sequentially"
                );
                let mut output = text.to_string();
                for substring in &substrings {
                    let value = replacement.apply(substring);
                    output = output.replace(substring, &value);
                }
                output
            }
        };

        tracing::debug!(
            policy = %policy,
            substrings = substrings.len(),
            "Text transformed"
        );
        Ok(output)
    }

    /// Parse `policy` and transform; an unknown policy fails before any
    /// text is touched
    pub fn transform_with_policy(
        &self,
        text: &str,
        findings: &FindingsMap,
        policy: &str,
    ) -> Result<String> {
        let policy: HandlingPolicy = policy.parse()?;
        self.transform(text, findings, policy)
    }
}

impl Default for TextTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a policy selector without transforming anything
pub fn parse_policy(policy: &str) -> Result<HandlingPolicy> {
    policy.parse()
}

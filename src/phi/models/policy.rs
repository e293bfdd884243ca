//! Handling policy applied to every finding of a request

use crate::domain::PhiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How detected PHI is neutralized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlingPolicy {
    /// Replace with a fixed marker
    Redact,
    /// Replace with a random alphanumeric token
    Tokenize,
    /// Replace with blank space of the same length
    Remove,
}

impl HandlingPolicy {
    /// Policy name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redact => "redact",
            Self::Tokenize => "tokenize",
            Self::Remove => "remove",
        }
    }
}

impl Default for HandlingPolicy {
    fn default() -> Self {
        Self::Redact
    }
}

impl fmt::Display for HandlingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlingPolicy {
    type Err = PhiError;

    /// Parse a policy selector. Matching is exact: selectors come from a
    /// closed set and anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redact" => Ok(Self::Redact),
            "tokenize" => Ok(Self::Tokenize),
            "remove" => Ok(Self::Remove),
            other => Err(PhiError::UnsupportedPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("redact", HandlingPolicy::Redact)]
    #[test_case("tokenize", HandlingPolicy::Tokenize)]
    #[test_case("remove", HandlingPolicy::Remove)]
    fn test_parse_known_policies(input: &str, expected: HandlingPolicy) {
        assert_eq!(input.parse::<HandlingPolicy>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test_case("shred")]
    #[test_case("")]
    #[test_case("Redact")]
    #[test_case("tokenise")]
    fn test_parse_rejects_unknown(input: &str) {
        let err = input.parse::<HandlingPolicy>().unwrap_err();
        assert!(matches!(err, PhiError::UnsupportedPolicy(ref p) if p == input));
    }
}

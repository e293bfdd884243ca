//! Random replacement tokens

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default token length for [`TokenMode::Fixed`]
pub const DEFAULT_FIXED_TOKEN_LENGTH: usize = 8;

/// How token length is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
    /// Token has as many characters as the substring it replaces
    #[default]
    MatchLength,
    /// Every token has the same length (deprecated)
    Fixed,
}

/// Generates random alphanumeric tokens
pub struct TokenGenerator {
    rng: StdRng,
}

impl TokenGenerator {
    /// Create a generator seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random `[A-Za-z0-9]` string of `len` characters
    pub fn generate(&mut self, len: usize) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request token assignments
///
/// Each distinct substring receives one token, reused for all of its
/// occurrences within the request. Nothing is retained across requests.
pub struct TokenVault {
    generator: TokenGenerator,
    mode: TokenMode,
    fixed_length: usize,
    tokens: HashMap<String, String>,
}

impl TokenVault {
    /// Create an empty vault
    pub fn new(mode: TokenMode, fixed_length: usize) -> Self {
        Self::with_generator(TokenGenerator::new(), mode, fixed_length)
    }

    /// Create an empty vault with a specific generator
    pub fn with_generator(generator: TokenGenerator, mode: TokenMode, fixed_length: usize) -> Self {
        Self {
            generator,
            mode,
            fixed_length: fixed_length.max(1),
            tokens: HashMap::new(),
        }
    }

    /// Token for `value`, generating one on first use
    pub fn token_for(&mut self, value: &str) -> String {
        if let Some(token) = self.tokens.get(value) {
            return token.clone();
        }

        let len = match self.mode {
            TokenMode::MatchLength => value.chars().count(),
            TokenMode::Fixed => self.fixed_length,
        };
        let token = self.generator.generate(len);
        self.tokens.insert(value.to_string(), token.clone());
        token
    }

    /// Number of distinct substrings tokenized so far
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no tokens were issued
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenVault {
    fn default() -> Self {
        Self::new(TokenMode::MatchLength, DEFAULT_FIXED_TOKEN_LENGTH)
    }
}

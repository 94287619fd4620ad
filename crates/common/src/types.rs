//! Common types used across Monitor AR
//!
//! This module provides the fundamental domain types shared by the
//! market-data, storage and monitor crates.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Normalized instrument identifier.
///
/// Feeds spell the same ticker as `al30`, `AL 30` or `AL-30`; all of them
/// normalize to `AL30` (uppercase, no spaces, no hyphens).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalize a raw ticker, rejecting identifiers that end up empty
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize_symbol(raw);
        if normalized.is_empty() {
            return Err(Error::invalid_input(format!("empty symbol: {:?}", raw)));
        }
        Ok(Self(normalized))
    }

    /// Get the normalized identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Uppercase and strip whitespace and hyphens
pub fn normalize_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("al30d"), "AL30D");
        assert_eq!(normalize_symbol(" AL 30-C "), "AL30C");
        assert_eq!(normalize_symbol("GD-30"), "GD30");
    }

    #[test]
    fn test_symbol_parse() {
        assert_eq!(Symbol::parse("al30").unwrap().as_str(), "AL30");
        assert!(Symbol::parse(" - ").is_err());
    }

    #[test]
    fn test_symbol_serde_transparent() {
        let sym = Symbol::parse("AL30").unwrap();
        assert_eq!(serde_json::to_string(&sym).unwrap(), r#""AL30""#);

        let back: Symbol = serde_json::from_str(r#""AL30""#).unwrap();
        assert_eq!(back, sym);
        assert_eq!(back.to_string(), "AL30");
    }
}

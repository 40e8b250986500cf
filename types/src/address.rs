//! Account identity for posters, workers, judges, and arbitrators.

use crate::error::TribunalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account identity (address or key fingerprint).
///
/// Ordered so registries can iterate participants deterministically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Longest identity accepted by [`AccountId::parse`].
    pub const MAX_LEN: usize = 128;

    /// Create an account id from a raw string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate an account id.
    ///
    /// Accepts non-empty ASCII alphanumerics plus `_`, `-` and `:`.
    pub fn parse(raw: &str) -> Result<Self, TribunalError> {
        if raw.is_empty() || raw.len() > Self::MAX_LEN {
            return Err(TribunalError::InvalidAccount(raw.to_string()));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
        {
            return Err(TribunalError::InvalidAccount(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Return the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_identities() {
        assert!(AccountId::parse("judge_01").is_ok());
        assert!(AccountId::parse("0xabc:poster").is_ok());
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!(AccountId::parse("").is_err());
        assert!(AccountId::parse("judge 1").is_err());
        assert!(AccountId::parse(&"a".repeat(AccountId::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(AccountId::new("a") < AccountId::new("b"));
    }
}

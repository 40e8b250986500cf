//! Case identifiers and content-addressed references.

use crate::error::TribunalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential identifier assigned to a case at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(u64);

impl CaseId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case#{}", self.0)
    }
}

/// A 32-byte content hash (requirements, submissions, commitments).
///
/// The protocol never inspects what the hash refers to.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TribunalError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| TribunalError::InvalidHash(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| TribunalError::InvalidHash(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parse_accepts_prefix() {
        let h = ContentHash::new([0xab; 32]);
        let s = format!("0x{h}");
        assert_eq!(ContentHash::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn hex_parse_rejects_short_input() {
        let err = ContentHash::from_hex("abcd").unwrap_err();
        assert_eq!(err.code(), "invalid_hash");
    }
}

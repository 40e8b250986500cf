//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for values that fail validation before reaching a component.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TribunalError {
    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    #[error("invalid verdict: {0}")]
    InvalidVerdict(String),

    #[error("partial percentage {percent} is not valid for a {verdict} verdict")]
    InvalidPercentage { verdict: String, percent: u8 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl TribunalError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAccount(_) => "invalid_account",
            Self::InvalidHash(_) => "invalid_hash",
            Self::InvalidVerdict(_) => "invalid_verdict",
            Self::InvalidPercentage { .. } => "invalid_percentage",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

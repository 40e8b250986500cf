use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RandomnessError {
    #[error("provider not available: {0}")]
    Unavailable(String),

    #[error("no entropy has been supplied yet")]
    NoEntropy,

    #[error("hash chain link does not extend the previous link")]
    BrokenChain,

    #[error("hash chain exhausted after {0} rounds")]
    ChainExhausted(u64),

    #[error("invalid proof")]
    InvalidProof,

    #[error("{0}")]
    Other(String),
}

impl RandomnessError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "randomness_unavailable",
            Self::NoEntropy => "randomness_no_entropy",
            Self::BrokenChain => "randomness_broken_chain",
            Self::ChainExhausted(_) => "randomness_chain_exhausted",
            Self::InvalidProof => "randomness_invalid_proof",
            Self::Other(_) => "randomness_other",
        }
    }
}

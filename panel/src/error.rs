use thiserror::Error;
use tribunal_vrf::RandomnessError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("eligible pool too small: have {eligible}, need {needed}")]
    InsufficientPool { eligible: usize, needed: usize },

    #[error("could not fill panel: seated {filled} of {needed} after {attempts} draws")]
    PanelIncomplete {
        filled: usize,
        needed: usize,
        attempts: u32,
    },

    #[error("expanded panel size {expanded} does not exceed current size {current}")]
    NothingToExpand { current: usize, expanded: usize },

    #[error("randomness unavailable: {0}")]
    Randomness(#[from] RandomnessError),
}

impl PanelError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientPool { .. } => "panel_insufficient_pool",
            Self::PanelIncomplete { .. } => "panel_incomplete",
            Self::NothingToExpand { .. } => "panel_nothing_to_expand",
            Self::Randomness(e) => e.code(),
        }
    }
}

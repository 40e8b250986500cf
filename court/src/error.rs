use thiserror::Error;
use tribunal_escrow::EscrowError;
use tribunal_panel::PanelError;
use tribunal_registry::RegistryError;
use tribunal_types::{AccountId, CaseId, TribunalError};
use tribunal_voting::VotingError;

#[derive(Debug, Error)]
pub enum CourtError {
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("panel selection: {0}")]
    Panel(#[from] PanelError),

    #[error("voting: {0}")]
    Voting(#[from] VotingError),

    #[error("escrow: {0}")]
    Escrow(#[from] EscrowError),

    #[error("invalid parameters: {0}")]
    Params(#[from] TribunalError),

    #[error("judge {judge} is seated on {case}; stake cannot drop below the minimum")]
    StakeLocked { judge: AccountId, case: CaseId },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl CourtError {
    /// The stable reason code of the underlying failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.code(),
            Self::Panel(e) => e.code(),
            Self::Voting(e) => e.code(),
            Self::Escrow(e) => e.code(),
            Self::Params(e) => e.code(),
            Self::StakeLocked { .. } => "court_stake_locked",
            Self::Config(_) => "court_config",
            Self::Snapshot(_) => "court_snapshot",
        }
    }
}

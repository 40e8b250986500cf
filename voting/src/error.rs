use thiserror::Error;
use tribunal_types::{AccountId, CaseId, Timestamp, TribunalError};

use crate::panel::VotingPhase;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VotingError {
    #[error("no panel is open for {0}")]
    NoPanel(CaseId),

    #[error("{case} is in the {actual:?} phase, expected {expected:?}")]
    WrongPhase {
        case: CaseId,
        expected: VotingPhase,
        actual: VotingPhase,
    },

    #[error("{0} is not a member of this panel")]
    NotPanelMember(AccountId),

    #[error("{0} has already committed")]
    AlreadyCommitted(AccountId),

    #[error("commitment is already held by another panel member")]
    CommitmentReused,

    #[error("commit deadline passed at {0}")]
    CommitDeadlinePassed(Timestamp),

    #[error("commit deadline not reached until {0}")]
    CommitDeadlineNotReached(Timestamp),

    #[error("{0} has no commitment to reveal")]
    NotCommitted(AccountId),

    #[error("{0} has already revealed")]
    AlreadyRevealed(AccountId),

    #[error("reveal deadline passed at {0}")]
    RevealDeadlinePassed(Timestamp),

    #[error("reveal deadline not reached until {0}")]
    RevealDeadlineNotReached(Timestamp),

    #[error("revealed vote does not match the commitment")]
    HashMismatch,

    #[error("malformed verdict: {0}")]
    InvalidVerdict(#[from] TribunalError),

    #[error("panel for {0} has duplicate or empty membership")]
    InvalidMembership(CaseId),
}

impl VotingError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoPanel(_) => "voting_no_panel",
            Self::WrongPhase { .. } => "voting_wrong_phase",
            Self::NotPanelMember(_) => "voting_not_panel_member",
            Self::AlreadyCommitted(_) => "voting_already_committed",
            Self::CommitmentReused => "voting_commitment_reused",
            Self::CommitDeadlinePassed(_) => "voting_commit_deadline_passed",
            Self::CommitDeadlineNotReached(_) => "voting_commit_deadline_not_reached",
            Self::NotCommitted(_) => "voting_not_committed",
            Self::AlreadyRevealed(_) => "voting_already_revealed",
            Self::RevealDeadlinePassed(_) => "voting_reveal_deadline_passed",
            Self::RevealDeadlineNotReached(_) => "voting_reveal_deadline_not_reached",
            Self::HashMismatch => "reveal_hash_mismatch",
            Self::InvalidVerdict(_) => "voting_invalid_verdict",
            Self::InvalidMembership(_) => "voting_invalid_membership",
        }
    }
}

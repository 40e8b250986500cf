use thiserror::Error;
use tribunal_types::{AccountId, Asset, CaseId, Timestamp, TribunalError};

/// Failures reported by a [`crate::FundsGateway`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FundsError {
    #[error("{account} holds {available} {asset}, needs {needed}")]
    InsufficientBalance {
        account: AccountId,
        asset: Asset,
        needed: u128,
        available: u128,
    },

    #[error("payout to {0} failed: {1}")]
    PayoutFailed(AccountId, String),

    #[error("arithmetic overflow in funds ledger")]
    Overflow,
}

impl FundsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "funds_insufficient_balance",
            Self::PayoutFailed(..) => "funds_payout_failed",
            Self::Overflow => "funds_overflow",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("{0} not found")]
    CaseNotFound(CaseId),

    #[error("{case} is {status}, cannot {action}")]
    WrongState {
        case: CaseId,
        status: String,
        action: &'static str,
    },

    #[error("escrowed amount must be non-zero")]
    ZeroAmount,

    #[error("submission deadline {deadline} is not after {now}")]
    DeadlineInPast { deadline: Timestamp, now: Timestamp },

    #[error("eligible judge pool has {eligible} members, a panel needs {needed}")]
    InsufficientJudgePool { eligible: usize, needed: usize },

    #[error("submission deadline passed at {0}")]
    SubmissionDeadlinePassed(Timestamp),

    #[error("the poster cannot submit work on their own case")]
    PosterCannotSubmit,

    #[error("{0} is not the poster of this case")]
    NotPoster(AccountId),

    #[error("{0} is not the escrow owner")]
    NotOwner(AccountId),

    #[error("{0} is not authorized to arbitrate this dispute")]
    NotArbitrator(AccountId),

    #[error("panel must be non-empty with distinct members, excluding the parties")]
    InvalidPanel,

    #[error("{0} is not on the panel for this case")]
    NotPanelMember(AccountId),

    #[error("a verdict from {0} is already recorded")]
    AlreadyVoted(AccountId),

    #[error("reveal phase open until {0} with votes outstanding")]
    RevealStillOpen(Timestamp),

    #[error("malformed outcome: {0}")]
    InvalidOutcome(#[from] TribunalError),

    #[error("{account} has nothing to withdraw in {asset}")]
    NothingToWithdraw { account: AccountId, asset: Asset },

    #[error("funds transfer failed: {0}")]
    Funds(#[from] FundsError),

    #[error("arithmetic overflow in settlement")]
    Overflow,
}

impl EscrowError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CaseNotFound(_) => "case_not_found",
            Self::WrongState { .. } => "case_wrong_state",
            Self::ZeroAmount => "case_zero_amount",
            Self::DeadlineInPast { .. } => "case_deadline_in_past",
            Self::InsufficientJudgePool { .. } => "case_insufficient_pool",
            Self::SubmissionDeadlinePassed(_) => "case_submission_deadline_passed",
            Self::PosterCannotSubmit => "case_poster_cannot_submit",
            Self::NotPoster(_) => "case_not_poster",
            Self::NotOwner(_) => "escrow_not_owner",
            Self::NotArbitrator(_) => "dispute_not_arbitrator",
            Self::InvalidPanel => "case_invalid_panel",
            Self::NotPanelMember(_) => "case_not_panel_member",
            Self::AlreadyVoted(_) => "case_already_voted",
            Self::RevealStillOpen(_) => "case_reveal_still_open",
            Self::InvalidOutcome(_) => "case_invalid_outcome",
            Self::NothingToWithdraw { .. } => "funds_nothing_to_withdraw",
            Self::Funds(inner) => inner.code(),
            Self::Overflow => "escrow_overflow",
        }
    }
}

//! Case events forming the escrow audit trail.

use crate::settlement::Payout;
use serde::{Deserialize, Serialize};
use tribunal_types::{AccountId, Amount, Asset, CaseId, ContentHash, Outcome, PanelRound, Timestamp, Verdict};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseEvent {
    CaseCreated {
        case: CaseId,
        poster: AccountId,
        asset: Asset,
        amount: Amount,
        fee: Amount,
        deadline: Timestamp,
    },
    WorkSubmitted {
        case: CaseId,
        worker: AccountId,
        submission: ContentHash,
    },
    PanelAssigned {
        case: CaseId,
        round: PanelRound,
        members: Vec<AccountId>,
        commit_deadline: Timestamp,
    },
    RevealOpened {
        case: CaseId,
        reveal_deadline: Timestamp,
    },
    VerdictRecorded {
        case: CaseId,
        participant: AccountId,
        verdict: Verdict,
        partial_percent: u8,
        synthetic: bool,
    },
    FundsReleased {
        case: CaseId,
        outcome: Outcome,
        payout: Payout,
    },
    DisputeOpened {
        case: CaseId,
        round: PanelRound,
        arbitration_deadline: Timestamp,
    },
    DisputeResolved {
        case: CaseId,
        arbitrator: AccountId,
        outcome: Outcome,
    },
    CaseCancelled {
        case: CaseId,
        refund: Amount,
    },
    Credited {
        account: AccountId,
        asset: Asset,
        amount: Amount,
    },
    Withdrawn {
        account: AccountId,
        asset: Asset,
        amount: Amount,
    },
    FailDeductionChanged {
        from: Amount,
        to: Amount,
    },
    TreasuryChanged {
        from: AccountId,
        to: AccountId,
    },
}

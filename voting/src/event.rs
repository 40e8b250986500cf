use serde::{Deserialize, Serialize};
use tribunal_types::{AccountId, CaseId, ContentHash, PanelRound, Timestamp, Verdict};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingEvent {
    PanelOpened {
        case: CaseId,
        round: PanelRound,
        members: Vec<AccountId>,
        commit_deadline: Timestamp,
    },
    Committed {
        case: CaseId,
        participant: AccountId,
        commitment: ContentHash,
    },
    RevealOpened {
        case: CaseId,
        reveal_deadline: Timestamp,
    },
    Revealed {
        case: CaseId,
        participant: AccountId,
        verdict: Verdict,
        partial_percent: u8,
    },
    NoRevealPenalized {
        case: CaseId,
        participant: AccountId,
    },
}

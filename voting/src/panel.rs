//! Panel state for one case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_crypto::Salt;
use tribunal_types::{AccountId, CaseId, ContentHash, PanelRound, Timestamp, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingPhase {
    /// Members are submitting sealed commitments.
    Commit,
    /// Members are revealing.
    Reveal,
    /// Every committed member has revealed or been penalized.
    Closed,
}

/// A vote disclosed during the reveal phase, or injected for a non-revealer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedVote {
    pub participant: AccountId,
    pub verdict: Verdict,
    pub partial_percent: u8,
    /// `None` for synthetic votes.
    pub salt: Option<Salt>,
    /// Injected by the no-reveal penalty rather than revealed.
    pub synthetic: bool,
    pub at: Timestamp,
}

/// Per-member commit/reveal record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub commitment: Option<ContentHash>,
    pub vote: Option<RevealedVote>,
}

/// The judges assigned to one case and their sealed votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub case_id: CaseId,
    pub round: PanelRound,
    /// Seating order is draw order.
    pub members: Vec<AccountId>,
    pub phase: VotingPhase,
    pub commit_deadline: Timestamp,
    /// Provisional until the reveal phase opens.
    pub reveal_deadline: Timestamp,
    pub records: BTreeMap<AccountId, MemberRecord>,
}

impl Panel {
    pub fn commit_count(&self) -> usize {
        self.records.values().filter(|r| r.commitment.is_some()).count()
    }

    pub fn reveal_count(&self) -> usize {
        self.records.values().filter(|r| r.vote.is_some()).count()
    }

    pub fn all_committed(&self) -> bool {
        self.commit_count() == self.members.len()
    }

    /// Every member who committed has a recorded vote.
    pub fn all_revealed(&self) -> bool {
        self.records
            .values()
            .all(|r| r.commitment.is_none() || r.vote.is_some())
    }

    /// Recorded votes in seating order.
    pub fn votes(&self) -> Vec<RevealedVote> {
        self.members
            .iter()
            .filter_map(|m| self.records.get(m).and_then(|r| r.vote.clone()))
            .collect()
    }

    /// Members who committed but have not revealed.
    pub fn pending_reveals(&self) -> Vec<AccountId> {
        self.members
            .iter()
            .filter(|m| {
                self.records
                    .get(*m)
                    .is_some_and(|r| r.commitment.is_some() && r.vote.is_none())
            })
            .cloned()
            .collect()
    }
}

//! Cases under escrow and their disputes.

use crate::status::CaseStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_types::{AccountId, Amount, Asset, CaseId, ContentHash, Outcome, PanelRound, Timestamp, Verdict};

/// Parameters for opening a case.
#[derive(Clone, Debug)]
pub struct NewCase {
    pub poster: AccountId,
    pub asset: Asset,
    pub amount: Amount,
    /// Last moment work may be submitted (exclusive).
    pub deadline: Timestamp,
    pub requirements: ContentHash,
}

/// A verdict recorded against a case for tallying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub verdict: Verdict,
    pub partial_percent: u8,
    /// Injected for a judge who never revealed.
    pub synthetic: bool,
}

impl Ballot {
    /// Whether this ballot sided with the settled outcome. Partial ballots
    /// agree with a partial outcome whatever percentage they named.
    pub fn agrees_with(&self, outcome: &Outcome) -> bool {
        self.verdict == outcome.verdict
    }
}

/// A round that ended without a supermajority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub case_id: CaseId,
    /// The round whose tally failed.
    pub round: PanelRound,
    pub opened_at: Timestamp,
    pub arbitration_deadline: Timestamp,
    /// Set once the arbitrator rules.
    pub resolution: Option<Outcome>,
    pub resolved_by: Option<AccountId>,
}

/// A bounty under escrow and adjudication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub poster: AccountId,
    pub worker: Option<AccountId>,
    pub asset: Asset,
    pub amount: Amount,
    /// Fixed at creation from the fee rate then in force.
    pub fee: Amount,
    pub created_at: Timestamp,
    pub deadline: Timestamp,
    pub requirements: ContentHash,
    pub submission: Option<ContentHash>,
    pub status: CaseStatus,
    pub outcome: Option<Outcome>,
    /// Judges of the current round, in seating order.
    pub panel: Vec<AccountId>,
    pub commit_deadline: Option<Timestamp>,
    pub reveal_deadline: Option<Timestamp>,
    /// Verdicts recorded in the current round.
    pub ballots: BTreeMap<AccountId, Ballot>,
    pub dispute: Option<Dispute>,
}

impl Case {
    pub fn is_party(&self, id: &AccountId) -> bool {
        &self.poster == id || self.worker.as_ref() == Some(id)
    }

    pub fn on_panel(&self, id: &AccountId) -> bool {
        self.panel.contains(id)
    }

    /// Every seated judge has a recorded verdict.
    pub fn all_voted(&self) -> bool {
        !self.panel.is_empty() && self.panel.iter().all(|m| self.ballots.contains_key(m))
    }

    /// Ballots in seating order.
    pub fn ballots_in_order(&self) -> Vec<(AccountId, Ballot)> {
        self.panel
            .iter()
            .filter_map(|m| self.ballots.get(m).map(|b| (m.clone(), *b)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ballot_agrees_regardless_of_percent() {
        let ballot = Ballot {
            verdict: Verdict::Partial,
            partial_percent: 30,
            synthetic: false,
        };
        let outcome = Outcome::new(Verdict::Partial, 70).unwrap();
        assert!(ballot.agrees_with(&outcome));
        assert!(!ballot.agrees_with(&Outcome::pass()));
    }
}

//! A registered judge.

use serde::{Deserialize, Serialize};
use tribunal_types::{AccountId, Amount, Timestamp};

/// A judge's record in the stake registry.
///
/// Deactivation never removes the record; a participant whose stake and
/// reputation recover may reactivate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: AccountId,
    pub stake: Amount,
    pub reputation: u32,
    /// Last verdict recorded, or the last decay checkpoint.
    pub last_active: Timestamp,
    pub registered_at: Timestamp,
    /// Lifetime verdicts scored against a final outcome.
    pub verdict_count: u64,
    /// Lifetime verdicts that agreed with the final outcome.
    pub agreement_count: u64,
    /// Consecutive verdicts on the losing side.
    pub minority_streak: u32,
    pub active: bool,
}

impl Participant {
    pub(crate) fn new(id: AccountId, stake: Amount, reputation: u32, now: Timestamp) -> Self {
        Self {
            id,
            stake,
            reputation,
            last_active: now,
            registered_at: now,
            verdict_count: 0,
            agreement_count: 0,
            minority_streak: 0,
            active: true,
        }
    }

    /// Lifetime agreement rate in basis points (0 when no verdicts yet).
    pub fn agreement_bps(&self) -> u32 {
        if self.verdict_count == 0 {
            return 0;
        }
        (self.agreement_count * 10_000 / self.verdict_count) as u32
    }
}

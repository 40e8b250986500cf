//! Co-service and agreement history between pairs of judges.
//!
//! The relation is symmetric and grows monotonically; records are never
//! removed. It only feeds the friendly-pair rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_types::AccountId;

/// History of one unordered pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    /// Resolved cases both judges revealed on.
    pub co_served: u32,
    /// Of those, cases where both revealed the same verdict.
    pub agreed: u32,
}

impl PairRecord {
    pub fn agreement_bps(&self) -> u32 {
        if self.co_served == 0 {
            return 0;
        }
        ((self.agreed as u64 * 10_000) / self.co_served as u64) as u32
    }
}

/// Keyed by the ordered pair `(lower, higher)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PairHistory {
    pairs: BTreeMap<(AccountId, AccountId), PairRecord>,
}

impl PairHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &AccountId, b: &AccountId) -> (AccountId, AccountId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Record one resolved case the pair co-served on.
    pub fn record(&mut self, a: &AccountId, b: &AccountId, agreed: bool) {
        if a == b {
            return;
        }
        let entry = self.pairs.entry(Self::key(a, b)).or_default();
        entry.co_served = entry.co_served.saturating_add(1);
        if agreed {
            entry.agreed = entry.agreed.saturating_add(1);
        }
    }

    pub fn get(&self, a: &AccountId, b: &AccountId) -> PairRecord {
        self.pairs.get(&Self::key(a, b)).copied().unwrap_or_default()
    }

    /// Whether the pair has co-served at least `min_cases` times with an
    /// agreement rate strictly above `max_agreement_bps`.
    pub fn is_friendly(
        &self,
        a: &AccountId,
        b: &AccountId,
        min_cases: u32,
        max_agreement_bps: u32,
    ) -> bool {
        let record = self.get(a, b);
        record.co_served >= min_cases && record.agreement_bps() > max_agreement_bps
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

//! Reputation-weighted panel selection with conflict and collusion exclusion.

use crate::error::PanelError;
use crate::pair_history::PairHistory;
use tribunal_registry::StakeRegistry;
use tribunal_types::{AccountId, CaseId, PanelRound, ProtocolParams};
use tribunal_vrf::{RandomOutput, RandomnessProvider};

const SELECTION_TAG: &[u8] = b"tribunal/panel/v1";

/// The case a panel is being drawn for.
#[derive(Clone, Debug)]
pub struct SelectionRequest {
    pub case_id: CaseId,
    pub poster: AccountId,
    /// Set once work has been submitted.
    pub worker: Option<AccountId>,
}

impl SelectionRequest {
    fn is_conflicted(&self, candidate: &AccountId) -> bool {
        candidate == &self.poster || self.worker.as_ref() == Some(candidate)
    }
}

/// Result of a successful draw.
#[derive(Clone, Debug)]
pub struct PanelDraw {
    /// Newly seated judges, in draw order.
    pub members: Vec<AccountId>,
    /// The randomness the draw was derived from, for later audit.
    pub randomness: RandomOutput,
    /// Weighted draws consumed, including skipped candidates.
    pub attempts: u32,
}

/// Draws panels and owns the pair history used by the friendly-pair rule.
pub struct PanelSelector {
    params: ProtocolParams,
    randomness: Box<dyn RandomnessProvider>,
    history: PairHistory,
}

impl PanelSelector {
    pub fn new(params: ProtocolParams, randomness: Box<dyn RandomnessProvider>) -> Self {
        Self::with_history(params, randomness, PairHistory::new())
    }

    pub fn with_history(
        params: ProtocolParams,
        randomness: Box<dyn RandomnessProvider>,
        history: PairHistory,
    ) -> Self {
        Self {
            params,
            randomness,
            history,
        }
    }

    pub fn history(&self) -> &PairHistory {
        &self.history
    }

    pub fn randomness(&self) -> &dyn RandomnessProvider {
        self.randomness.as_ref()
    }

    /// Swap the randomness source without touching selection logic.
    pub fn set_randomness(&mut self, randomness: Box<dyn RandomnessProvider>) {
        tracing::info!(
            from = self.randomness.name(),
            to = randomness.name(),
            "panel randomness provider replaced"
        );
        self.randomness = randomness;
    }

    /// Draw a standard panel for a case.
    pub fn select_panel(
        &self,
        request: &SelectionRequest,
        registry: &StakeRegistry,
    ) -> Result<PanelDraw, PanelError> {
        let needed = PanelRound::Standard.panel_size(&self.params);
        let pool = registry.eligible_pool();
        if pool.len() < needed {
            return Err(PanelError::InsufficientPool {
                eligible: pool.len(),
                needed,
            });
        }
        self.draw(request, PanelRound::Standard, &pool, &[], needed)
    }

    /// Draw the additional judges that widen `current` into an expanded panel.
    ///
    /// Returns only the new members; every one is distinct from `current`.
    pub fn expand_panel(
        &self,
        request: &SelectionRequest,
        current: &[AccountId],
        registry: &StakeRegistry,
    ) -> Result<PanelDraw, PanelError> {
        let expanded = PanelRound::Expanded.panel_size(&self.params);
        if expanded <= current.len() {
            return Err(PanelError::NothingToExpand {
                current: current.len(),
                expanded,
            });
        }
        let needed = expanded - current.len();
        let pool: Vec<(AccountId, u32)> = registry
            .eligible_pool()
            .into_iter()
            .filter(|(id, _)| !current.contains(id))
            .collect();
        if pool.len() < needed {
            return Err(PanelError::InsufficientPool {
                eligible: pool.len(),
                needed,
            });
        }
        self.draw(request, PanelRound::Expanded, &pool, current, needed)
    }

    /// Record the outcome of one co-served case for a pair of revealed judges.
    pub fn record_agreement(&mut self, a: &AccountId, b: &AccountId, agreed: bool) {
        self.history.record(a, b, agreed);
    }

    pub fn is_friendly(&self, a: &AccountId, b: &AccountId) -> bool {
        self.history.is_friendly(
            a,
            b,
            self.params.friendly_min_cases,
            self.params.friendly_agreement_bps,
        )
    }

    /// Weighted sampling without replacement.
    ///
    /// Each draw hashes the seed with the attempt counter into a ticket in
    /// `[0, total_weight)` and seats the candidate whose cumulative weight
    /// range covers it, unless the candidate must be skipped.
    fn draw(
        &self,
        request: &SelectionRequest,
        round: PanelRound,
        pool: &[(AccountId, u32)],
        seated: &[AccountId],
        needed: usize,
    ) -> Result<PanelDraw, PanelError> {
        let case_bytes = request.case_id.to_le_bytes();
        let parts: [&[u8]; 3] = [SELECTION_TAG, &case_bytes, &[round.as_byte()]];
        let context = parts.concat();
        let randomness = self.randomness.get_randomness(&context)?;

        let mut prefix = Vec::with_capacity(pool.len());
        let mut total: u64 = 0;
        for (_, weight) in pool {
            total += *weight as u64;
            prefix.push(total);
        }
        if total == 0 {
            return Err(PanelError::InsufficientPool {
                eligible: 0,
                needed,
            });
        }

        let max_attempts = self.params.max_selection_attempts;
        let mut members: Vec<AccountId> = Vec::with_capacity(needed);
        let mut attempts: u32 = 0;
        while members.len() < needed {
            if attempts >= max_attempts {
                tracing::warn!(
                    case = %request.case_id,
                    %round,
                    filled = members.len(),
                    needed,
                    attempts,
                    "panel selection exhausted its attempt budget"
                );
                return Err(PanelError::PanelIncomplete {
                    filled: members.len(),
                    needed,
                    attempts,
                });
            }
            let ticket = draw_ticket(&randomness.value, attempts) % total;
            attempts += 1;
            let index = prefix.partition_point(|&p| p <= ticket);
            let candidate = &pool[index].0;

            if members.contains(candidate) || seated.contains(candidate) {
                continue;
            }
            if request.is_conflicted(candidate) {
                tracing::debug!(case = %request.case_id, %candidate, "skipping conflicted candidate");
                continue;
            }
            if seated
                .iter()
                .chain(members.iter())
                .any(|m| self.is_friendly(m, candidate))
            {
                tracing::debug!(case = %request.case_id, %candidate, "skipping friendly-pair candidate");
                continue;
            }
            members.push(candidate.clone());
        }

        tracing::info!(
            case = %request.case_id,
            %round,
            seated = members.len(),
            attempts,
            provider = self.randomness.name(),
            "panel drawn"
        );
        Ok(PanelDraw {
            members,
            randomness,
            attempts,
        })
    }
}

fn draw_ticket(seed: &[u8; 32], attempt: u32) -> u64 {
    let digest = tribunal_crypto::blake2b_256_multi(&[seed, &attempt.to_le_bytes()]);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_types::{Amount, Timestamp};
    use tribunal_vrf::RandomnessError;

    struct FixedRandom {
        seed: [u8; 32],
    }

    impl RandomnessProvider for FixedRandom {
        fn get_randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomnessError> {
            Ok(RandomOutput {
                value: self.seed,
                proof: vec![],
                round: 0,
            })
        }
        fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomnessError> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "fixed-test-random"
        }
    }

    struct FailingRandom;

    impl RandomnessProvider for FailingRandom {
        fn get_randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomnessError> {
            Err(RandomnessError::Unavailable("test".into()))
        }
        fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomnessError> {
            Ok(false)
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn judge(i: usize) -> AccountId {
        AccountId::new(format!("judge_{i}"))
    }

    fn registry(n: usize) -> StakeRegistry {
        let mut reg = StakeRegistry::new(ProtocolParams::default());
        for i in 0..n {
            reg.register(judge(i), Amount::new(5_000), Timestamp::new(0))
                .unwrap();
        }
        reg
    }

    fn selector(seed: u8) -> PanelSelector {
        PanelSelector::new(ProtocolParams::default(), Box::new(FixedRandom { seed: [seed; 32] }))
    }

    fn request(poster: AccountId, worker: Option<AccountId>) -> SelectionRequest {
        SelectionRequest {
            case_id: CaseId::new(1),
            poster,
            worker,
        }
    }

    #[test]
    fn selection_is_deterministic() {
        let reg = registry(12);
        let req = request(AccountId::new("poster"), None);
        let a = selector(42).select_panel(&req, &reg).unwrap();
        let b = selector(42).select_panel(&req, &reg).unwrap();
        assert_eq!(a.members, b.members);
        assert_eq!(a.members.len(), 5);
    }

    #[test]
    fn pool_smaller_than_panel_fails_fast() {
        let reg = registry(4);
        let err = selector(1)
            .select_panel(&request(AccountId::new("poster"), None), &reg)
            .unwrap_err();
        assert_eq!(err, PanelError::InsufficientPool { eligible: 4, needed: 5 });
    }

    #[test]
    fn conflicted_pool_cannot_fill() {
        // Five judges, one of them is the worker: a full panel is impossible.
        let reg = registry(5);
        let err = selector(3)
            .select_panel(&request(AccountId::new("poster"), Some(judge(2))), &reg)
            .unwrap_err();
        assert_eq!(err.code(), "panel_incomplete");
    }

    #[test]
    fn randomness_failure_is_propagated() {
        let reg = registry(6);
        let sel = PanelSelector::new(ProtocolParams::default(), Box::new(FailingRandom));
        let err = sel
            .select_panel(&request(AccountId::new("poster"), None), &reg)
            .unwrap_err();
        assert_eq!(err.code(), "randomness_unavailable");
    }

    #[test]
    fn expansion_adds_distinct_members() {
        let reg = registry(15);
        let sel = selector(9);
        let req = request(AccountId::new("poster"), Some(AccountId::new("worker")));
        let first = sel.select_panel(&req, &reg).unwrap();
        let extra = sel.expand_panel(&req, &first.members, &reg).unwrap();
        assert_eq!(extra.members.len(), 4);
        for m in &extra.members {
            assert!(!first.members.contains(m));
        }
    }

    #[test]
    fn expansion_needs_enough_fresh_judges() {
        let reg = registry(7);
        let sel = selector(9);
        let req = request(AccountId::new("poster"), None);
        let first = sel.select_panel(&req, &reg).unwrap();
        let err = sel.expand_panel(&req, &first.members, &reg).unwrap_err();
        assert_eq!(err, PanelError::InsufficientPool { eligible: 2, needed: 4 });
    }

    #[test]
    fn friendly_pair_never_seated_together() {
        let reg = registry(6);
        let mut sel = selector(5);
        for _ in 0..3 {
            sel.record_agreement(&judge(0), &judge(1), true);
        }
        assert!(sel.is_friendly(&judge(0), &judge(1)));
        let req = request(AccountId::new("poster"), None);
        let draw = sel.select_panel(&req, &reg).unwrap();
        assert!(!(draw.members.contains(&judge(0)) && draw.members.contains(&judge(1))));
    }

    #[test]
    fn ticket_depends_on_attempt() {
        let seed = [7u8; 32];
        assert_ne!(draw_ticket(&seed, 0), draw_ticket(&seed, 1));
    }
}

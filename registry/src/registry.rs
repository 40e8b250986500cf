//! The stake registry.

use crate::error::RegistryError;
use crate::event::{DeactivationReason, RegistryEvent};
use crate::participant::Participant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_types::{AccountId, Amount, ProtocolParams, Timestamp};

/// Membership, collateral, and reputation ledger.
///
/// Participants are kept in a `BTreeMap` so the eligible pool is always
/// listed in the same order on every node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StakeRegistry {
    params: ProtocolParams,
    participants: BTreeMap<AccountId, Participant>,
    /// Slashed collateral not yet routed to the treasury.
    slashed_unclaimed: Amount,
    #[serde(skip)]
    pending_events: Vec<RegistryEvent>,
}

impl StakeRegistry {
    pub fn new(params: ProtocolParams) -> Self {
        Self {
            params,
            participants: BTreeMap::new(),
            slashed_unclaimed: Amount::ZERO,
            pending_events: Vec::new(),
        }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    // ── Membership and collateral ──────────────────────────────────────────

    /// Register a new judge with an initial stake of at least `min_stake`.
    pub fn register(
        &mut self,
        id: AccountId,
        stake: Amount,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        if self.participants.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        if stake.raw() < self.params.min_stake as u128 {
            return Err(RegistryError::StakeBelowMinimum {
                needed: self.params.min_stake as u128,
                provided: stake.raw(),
            });
        }
        let participant = Participant::new(id.clone(), stake, self.params.default_reputation, now);
        self.participants.insert(id.clone(), participant);
        tracing::info!(participant = %id, %stake, "judge registered");
        self.pending_events.push(RegistryEvent::Registered {
            participant: id,
            stake,
        });
        Ok(())
    }

    /// Add collateral. Does not reactivate on its own; see [`Self::reactivate`].
    pub fn increase_stake(&mut self, id: &AccountId, amount: Amount) -> Result<Amount, RegistryError> {
        if amount.is_zero() {
            return Err(RegistryError::ZeroAmount);
        }
        let participant = self.get_mut(id)?;
        participant.stake = participant
            .stake
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;
        let total = participant.stake;
        self.pending_events.push(RegistryEvent::StakeIncreased {
            participant: id.clone(),
            amount,
            total,
        });
        Ok(total)
    }

    /// Withdraw collateral. Dropping below `min_stake` while active deactivates.
    pub fn withdraw_stake(&mut self, id: &AccountId, amount: Amount) -> Result<Amount, RegistryError> {
        if amount.is_zero() {
            return Err(RegistryError::ZeroAmount);
        }
        let min_stake = self.params.min_stake as u128;
        let participant = self.get_mut(id)?;
        let remaining =
            participant
                .stake
                .checked_sub(amount)
                .ok_or(RegistryError::InsufficientStake {
                    requested: amount.raw(),
                    available: participant.stake.raw(),
                })?;
        participant.stake = remaining;
        let deactivate = participant.active && remaining.raw() < min_stake;
        self.pending_events.push(RegistryEvent::StakeWithdrawn {
            participant: id.clone(),
            amount,
            remaining,
        });
        if deactivate {
            self.deactivate(id, DeactivationReason::StakeBelowMinimum);
        }
        Ok(remaining)
    }

    /// Reactivate a deactivated judge whose stake and reputation meet the floors.
    pub fn reactivate(&mut self, id: &AccountId) -> Result<(), RegistryError> {
        let min_stake = self.params.min_stake as u128;
        let low_water = self.params.reputation_low_water;
        let participant = self.get_mut(id)?;
        if participant.active {
            return Err(RegistryError::AlreadyActive(id.clone()));
        }
        if participant.stake.raw() < min_stake || participant.reputation < low_water {
            return Err(RegistryError::ReactivationDenied {
                stake: participant.stake.raw(),
                min_stake,
                reputation: participant.reputation,
                min_reputation: low_water,
            });
        }
        participant.active = true;
        tracing::info!(participant = %id, "judge reactivated");
        self.pending_events.push(RegistryEvent::Reactivated {
            participant: id.clone(),
        });
        Ok(())
    }

    // ── Reputation paths ───────────────────────────────────────────────────

    /// Score a revealed verdict against the final outcome.
    ///
    /// Agreement adds `agreement_reward` and clears the minority streak.
    /// Disagreement removes `disagreement_penalty`, extends the streak, and
    /// slashes once the streak reaches `minority_streak_slash_threshold`.
    pub fn record_verdict_result(
        &mut self,
        id: &AccountId,
        agreed: bool,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let params = self.params.clone();
        let participant = self.get_mut(id)?;
        participant.verdict_count += 1;
        participant.last_active = now;
        let from = participant.reputation;
        let slash_due = if agreed {
            participant.agreement_count += 1;
            participant.minority_streak = 0;
            participant.reputation = from
                .saturating_add(params.agreement_reward)
                .min(params.max_reputation);
            false
        } else {
            participant.minority_streak += 1;
            participant.reputation = from
                .saturating_sub(params.disagreement_penalty)
                .max(params.min_reputation);
            participant.minority_streak >= params.minority_streak_slash_threshold
        };
        let to = participant.reputation;
        tracing::debug!(participant = %id, agreed, from, to, "verdict scored");
        self.reputation_changed(id, from, to);

        if slash_due {
            self.slash(id)?;
        } else {
            self.enforce_low_water(id);
        }
        Ok(())
    }

    /// Remove `slash_bps` of stake and `slash_reputation_penalty` reputation.
    ///
    /// The slashed collateral accumulates until [`Self::take_slashed`] routes
    /// it to the treasury. Returns the amount slashed.
    pub fn slash(&mut self, id: &AccountId) -> Result<Amount, RegistryError> {
        let params = self.params.clone();
        let participant = self.get_mut(id)?;
        let amount = participant
            .stake
            .mul_bps(params.slash_bps)
            .ok_or(RegistryError::Overflow)?;
        participant.stake = participant.stake.saturating_sub(amount);
        let from = participant.reputation;
        participant.reputation = from
            .saturating_sub(params.slash_reputation_penalty)
            .max(params.min_reputation);
        participant.minority_streak = 0;
        let to = participant.reputation;
        let stake_short = participant.active && participant.stake.raw() < params.min_stake as u128;

        self.slashed_unclaimed = self
            .slashed_unclaimed
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;
        tracing::warn!(participant = %id, %amount, reputation = to, "judge slashed");
        self.pending_events.push(RegistryEvent::Slashed {
            participant: id.clone(),
            amount,
            reputation: to,
        });
        self.reputation_changed(id, from, to);

        if stake_short {
            self.deactivate(id, DeactivationReason::StakeBelowMinimum);
        } else {
            self.enforce_low_water(id);
        }
        Ok(amount)
    }

    /// Apply inactivity decay for every full period since the last activity.
    ///
    /// The inactivity clock advances by the periods consumed, so calling this
    /// twice never double-counts. Returns the number of periods applied.
    pub fn apply_decay(&mut self, id: &AccountId, now: Timestamp) -> Result<u64, RegistryError> {
        let params = self.params.clone();
        let participant = self.get_mut(id)?;
        let periods = participant.last_active.elapsed_since(now) / params.decay_period_secs;
        if periods == 0 {
            return Ok(0);
        }
        let penalty = periods
            .saturating_mul(params.decay_per_period as u64)
            .min(u32::MAX as u64) as u32;
        let from = participant.reputation;
        participant.reputation = from.saturating_sub(penalty).max(params.min_reputation);
        participant.last_active = participant
            .last_active
            .plus(periods.saturating_mul(params.decay_period_secs));
        let to = participant.reputation;
        tracing::debug!(participant = %id, periods, from, to, "reputation decayed");
        self.reputation_changed(id, from, to);
        self.enforce_low_water(id);
        Ok(periods)
    }

    // ── Treasury routing ───────────────────────────────────────────────────

    /// Slashed collateral awaiting routing to the treasury.
    pub fn slashed_unclaimed(&self) -> Amount {
        self.slashed_unclaimed
    }

    /// Take all slashed collateral for routing to the treasury.
    pub fn take_slashed(&mut self) -> Amount {
        std::mem::take(&mut self.slashed_unclaimed)
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn participant(&self, id: &AccountId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn reputation(&self, id: &AccountId) -> Option<u32> {
        self.participants.get(id).map(|p| p.reputation)
    }

    /// Active and at or above the reputation low-water mark.
    pub fn is_eligible(&self, id: &AccountId) -> bool {
        self.participants
            .get(id)
            .is_some_and(|p| self.eligible(p))
    }

    /// Eligible judges with their reputation (the selection weight), in id order.
    pub fn eligible_pool(&self) -> Vec<(AccountId, u32)> {
        self.participants
            .values()
            .filter(|p| self.eligible(p))
            .map(|p| (p.id.clone(), p.reputation))
            .collect()
    }

    pub fn eligible_count(&self) -> usize {
        self.participants.values().filter(|p| self.eligible(p)).count()
    }

    pub fn active_count(&self) -> usize {
        self.participants.values().filter(|p| p.active).count()
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn eligible(&self, p: &Participant) -> bool {
        p.active && p.reputation >= self.params.reputation_low_water
    }

    fn get_mut(&mut self, id: &AccountId) -> Result<&mut Participant, RegistryError> {
        self.participants
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotRegistered(id.clone()))
    }

    fn reputation_changed(&mut self, id: &AccountId, from: u32, to: u32) {
        if from != to {
            self.pending_events.push(RegistryEvent::ReputationChanged {
                participant: id.clone(),
                from,
                to,
            });
        }
    }

    fn enforce_low_water(&mut self, id: &AccountId) {
        let below = self
            .participants
            .get(id)
            .is_some_and(|p| p.active && p.reputation < self.params.reputation_low_water);
        if below {
            self.deactivate(id, DeactivationReason::ReputationBelowLowWater);
        }
    }

    fn deactivate(&mut self, id: &AccountId, reason: DeactivationReason) {
        if let Some(p) = self.participants.get_mut(id) {
            if p.active {
                p.active = false;
                tracing::warn!(participant = %id, ?reason, "judge deactivated");
                self.pending_events.push(RegistryEvent::Deactivated {
                    participant: id.clone(),
                    reason,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judge(s: &str) -> AccountId {
        AccountId::new(format!("judge_{s}"))
    }

    fn registry_with(ids: &[&str]) -> StakeRegistry {
        let mut reg = StakeRegistry::new(ProtocolParams::default());
        for id in ids {
            reg.register(judge(id), Amount::new(2_000), Timestamp::new(0))
                .unwrap();
        }
        reg
    }

    #[test]
    fn register_requires_minimum_stake() {
        let mut reg = StakeRegistry::new(ProtocolParams::default());
        let err = reg
            .register(judge("a"), Amount::new(999), Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err.code(), "registry_stake_below_minimum");
        assert!(reg.participant(&judge("a")).is_none());
    }

    #[test]
    fn double_registration_rejected() {
        let mut reg = registry_with(&["a"]);
        let err = reg
            .register(judge("a"), Amount::new(5_000), Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered(judge("a")));
    }

    #[test]
    fn new_participant_has_default_reputation_and_is_eligible() {
        let reg = registry_with(&["a"]);
        assert_eq!(reg.reputation(&judge("a")), Some(500));
        assert!(reg.is_eligible(&judge("a")));
        assert_eq!(reg.eligible_pool(), vec![(judge("a"), 500)]);
    }

    #[test]
    fn withdraw_below_minimum_deactivates() {
        let mut reg = registry_with(&["a"]);
        let remaining = reg.withdraw_stake(&judge("a"), Amount::new(1_500)).unwrap();
        assert_eq!(remaining, Amount::new(500));
        assert!(!reg.is_eligible(&judge("a")));
        assert_eq!(reg.active_count(), 0);
    }

    #[test]
    fn withdraw_more_than_stake_rejected() {
        let mut reg = registry_with(&["a"]);
        let err = reg.withdraw_stake(&judge("a"), Amount::new(2_001)).unwrap_err();
        assert_eq!(err.code(), "registry_insufficient_stake");
        assert_eq!(reg.participant(&judge("a")).unwrap().stake, Amount::new(2_000));
    }

    #[test]
    fn agreement_raises_reputation_capped() {
        let mut reg = registry_with(&["a"]);
        for i in 0..100 {
            reg.record_verdict_result(&judge("a"), true, Timestamp::new(i))
                .unwrap();
        }
        let p = reg.participant(&judge("a")).unwrap();
        assert_eq!(p.reputation, 1_000);
        assert_eq!(p.agreement_count, 100);
        assert_eq!(p.agreement_bps(), 10_000);
    }

    #[test]
    fn third_minority_verdict_slashes() {
        let mut reg = registry_with(&["a"]);
        let id = judge("a");
        reg.record_verdict_result(&id, false, Timestamp::new(1)).unwrap();
        reg.record_verdict_result(&id, false, Timestamp::new(2)).unwrap();
        assert_eq!(reg.participant(&id).unwrap().minority_streak, 2);
        reg.record_verdict_result(&id, false, Timestamp::new(3)).unwrap();

        let p = reg.participant(&id).unwrap();
        // 500 - 3 * 25 - 100
        assert_eq!(p.reputation, 325);
        assert_eq!(p.stake, Amount::new(1_800));
        assert_eq!(p.minority_streak, 0);
        assert_eq!(reg.slashed_unclaimed(), Amount::new(200));
    }

    #[test]
    fn agreement_resets_minority_streak() {
        let mut reg = registry_with(&["a"]);
        let id = judge("a");
        reg.record_verdict_result(&id, false, Timestamp::new(1)).unwrap();
        reg.record_verdict_result(&id, false, Timestamp::new(2)).unwrap();
        reg.record_verdict_result(&id, true, Timestamp::new(3)).unwrap();
        reg.record_verdict_result(&id, false, Timestamp::new(4)).unwrap();
        assert_eq!(reg.participant(&id).unwrap().minority_streak, 1);
        assert!(reg.slashed_unclaimed().is_zero());
    }

    #[test]
    fn slash_below_minimum_stake_deactivates() {
        let mut reg = StakeRegistry::new(ProtocolParams::default());
        let id = judge("a");
        reg.register(id.clone(), Amount::new(1_000), Timestamp::new(0)).unwrap();
        let slashed = reg.slash(&id).unwrap();
        assert_eq!(slashed, Amount::new(100));
        assert!(!reg.participant(&id).unwrap().active);
        assert_eq!(reg.take_slashed(), Amount::new(100));
        assert!(reg.slashed_unclaimed().is_zero());
    }

    #[test]
    fn reputation_below_low_water_deactivates() {
        let mut reg = registry_with(&["a"]);
        let id = judge("a");
        // 500 -> 400 -> 300 -> 200 stays eligible, 100 falls below 200.
        for _ in 0..3 {
            reg.slash(&id).unwrap();
        }
        assert!(reg.is_eligible(&id));
        reg.slash(&id).unwrap();
        assert!(!reg.is_eligible(&id));
        let events = reg.drain_events();
        assert!(events.contains(&RegistryEvent::Deactivated {
            participant: id,
            reason: DeactivationReason::ReputationBelowLowWater,
        }));
    }

    #[test]
    fn decay_applies_per_full_period_once() {
        let mut reg = registry_with(&["a"]);
        let id = judge("a");
        let period = reg.params().decay_period_secs;
        let now = Timestamp::new(period * 2 + period / 2);
        assert_eq!(reg.apply_decay(&id, now).unwrap(), 2);
        assert_eq!(reg.reputation(&id), Some(460));
        assert_eq!(reg.apply_decay(&id, now).unwrap(), 0);
        assert_eq!(reg.reputation(&id), Some(460));
        // The half period carried over completes one more period.
        assert_eq!(reg.apply_decay(&id, now.plus(period / 2)).unwrap(), 1);
        assert_eq!(reg.reputation(&id), Some(440));
    }

    #[test]
    fn reactivation_requires_both_floors() {
        let mut reg = registry_with(&["a"]);
        let id = judge("a");
        reg.withdraw_stake(&id, Amount::new(1_500)).unwrap();
        let err = reg.reactivate(&id).unwrap_err();
        assert_eq!(err.code(), "registry_reactivation_denied");
        reg.increase_stake(&id, Amount::new(600)).unwrap();
        reg.reactivate(&id).unwrap();
        assert!(reg.is_eligible(&id));
        assert_eq!(reg.reactivate(&id).unwrap_err().code(), "registry_already_active");
    }

    #[test]
    fn unknown_participant_rejected() {
        let mut reg = registry_with(&[]);
        assert_eq!(
            reg.slash(&judge("ghost")).unwrap_err().code(),
            "registry_not_registered"
        );
    }
}

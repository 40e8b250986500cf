//! Protocol parameters: every fixed magnitude the protocol depends on.
//!
//! The values are constants for a running deployment: fairness depends on
//! adjustments being predictable, so nothing here is derived at runtime.
//! Only the escrow owner's fail-refund deduction is adjustable after start.

use crate::error::TribunalError;
use serde::{Deserialize, Serialize};

const DAY_SECS: u64 = 24 * 3600;

/// All protocol parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    // ── Stake registry ───────────────────────────────────────────────────
    /// Minimum collateral (raw) to register and to stay active.
    pub min_stake: u64,

    /// Reputation assigned on registration.
    pub default_reputation: u32,

    /// Reputation ceiling.
    pub max_reputation: u32,

    /// Reputation floor.
    pub min_reputation: u32,

    /// Below this reputation a judge is deactivated and leaves the eligible pool.
    pub reputation_low_water: u32,

    /// Reputation gained for agreeing with the final verdict.
    pub agreement_reward: u32,

    /// Reputation lost for disagreeing with the final verdict.
    pub disagreement_penalty: u32,

    /// Consecutive minority verdicts that trigger a slash.
    pub minority_streak_slash_threshold: u32,

    /// Share of stake removed by a slash (basis points).
    pub slash_bps: u32,

    /// Extra reputation removed by a slash.
    pub slash_reputation_penalty: u32,

    /// Length of one inactivity period for reputation decay.
    pub decay_period_secs: u64,

    /// Reputation removed per full inactivity period.
    pub decay_per_period: u32,

    // ── Panel selection ──────────────────────────────────────────────────
    /// Judges on a standard panel.
    pub panel_size: u32,

    /// Judges on an expanded (dispute) panel, including the prior members.
    pub expanded_panel_size: u32,

    /// Weighted draws allowed per panel fill before giving up.
    pub max_selection_attempts: u32,

    /// Co-served cases before the friendly-pair rule applies.
    pub friendly_min_cases: u32,

    /// Agreement rate above which a pair is too friendly (basis points, exclusive).
    pub friendly_agreement_bps: u32,

    // ── Voting ───────────────────────────────────────────────────────────
    /// Votes for a single verdict needed on a standard panel.
    pub supermajority: u32,

    /// Votes for a single verdict needed on an expanded panel.
    pub expanded_supermajority: u32,

    /// Duration of the commit phase.
    pub commit_window_secs: u64,

    /// Duration of the reveal phase.
    pub reveal_window_secs: u64,

    /// Time the arbitrator has to rule on a dispute.
    pub arbitration_window_secs: u64,

    // ── Settlement ───────────────────────────────────────────────────────
    /// Protocol fee on the escrowed amount (basis points).
    pub fee_bps: u32,

    /// Flat deduction taken from a Fail refund and routed to the treasury.
    pub fail_operational_deduction: u64,
}

impl ProtocolParams {
    /// Defaults intended for a live deployment.
    pub fn tribunal_defaults() -> Self {
        Self {
            min_stake: 1_000,
            default_reputation: 500,
            max_reputation: 1_000,
            min_reputation: 0,
            reputation_low_water: 200,
            agreement_reward: 10,
            disagreement_penalty: 25,
            minority_streak_slash_threshold: 3,
            slash_bps: 1_000, // 10%
            slash_reputation_penalty: 100,
            decay_period_secs: 30 * DAY_SECS,
            decay_per_period: 20,

            panel_size: 5,
            expanded_panel_size: 9,
            max_selection_attempts: 256,
            friendly_min_cases: 3,
            friendly_agreement_bps: 9_000, // 90%

            supermajority: 4,
            expanded_supermajority: 6,
            commit_window_secs: DAY_SECS,
            reveal_window_secs: DAY_SECS,
            arbitration_window_secs: 7 * DAY_SECS,

            fee_bps: 200, // 2%
            fail_operational_deduction: 0,
        }
    }

    /// Short windows for local simulation; magnitudes are unchanged.
    pub fn simulation_defaults() -> Self {
        Self {
            commit_window_secs: 600,
            reveal_window_secs: 600,
            arbitration_window_secs: 3600,
            ..Self::tribunal_defaults()
        }
    }

    /// Reject parameter sets that would make the protocol unsound.
    pub fn validate(&self) -> Result<(), TribunalError> {
        let fail = |msg: &str| -> Result<(), TribunalError> {
            Err(TribunalError::Config(msg.to_string()))
        };
        if self.min_reputation > self.max_reputation {
            return fail("min_reputation exceeds max_reputation");
        }
        if !(self.min_reputation..=self.max_reputation).contains(&self.default_reputation) {
            return fail("default_reputation outside reputation range");
        }
        if self.default_reputation < self.reputation_low_water {
            return fail("default_reputation below reputation_low_water");
        }
        if self.reputation_low_water == 0 {
            return fail("reputation_low_water must be positive (it doubles as the minimum selection weight)");
        }
        if self.panel_size == 0 || self.expanded_panel_size <= self.panel_size {
            return fail("expanded_panel_size must exceed a non-zero panel_size");
        }
        if self.supermajority * 2 <= self.panel_size || self.supermajority > self.panel_size {
            return fail("supermajority must be a strict majority of panel_size");
        }
        if self.expanded_supermajority * 2 <= self.expanded_panel_size
            || self.expanded_supermajority > self.expanded_panel_size
        {
            return fail("expanded_supermajority must be a strict majority of expanded_panel_size");
        }
        if self.fee_bps as u128 > crate::amount::BPS_DENOMINATOR
            || self.slash_bps as u128 > crate::amount::BPS_DENOMINATOR
            || self.friendly_agreement_bps as u128 > crate::amount::BPS_DENOMINATOR
        {
            return fail("basis-point values must not exceed 10000");
        }
        if self.max_selection_attempts < self.expanded_panel_size {
            return fail("max_selection_attempts cannot fill a panel");
        }
        if self.decay_period_secs == 0 {
            return fail("decay_period_secs must be positive");
        }
        Ok(())
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::tribunal_defaults()
    }
}

//! Verdict tallying and settlement arithmetic.
//!
//! All arithmetic is integer and rounds down. Whatever a rounding step
//! leaves over goes to the party receiving "the rest", so the three payouts
//! always sum to the escrowed amount.

use crate::case::Ballot;
use crate::error::EscrowError;
use serde::{Deserialize, Serialize};
use tribunal_types::{Amount, Outcome, Verdict};

/// How a settled amount is divided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub worker: Amount,
    pub poster: Amount,
    pub treasury: Amount,
}

impl Payout {
    pub fn total(&self) -> Option<Amount> {
        self.worker
            .checked_add(self.poster)?
            .checked_add(self.treasury)
    }
}

/// Split `amount` according to `outcome`.
///
/// - Pass: worker gets `amount - fee`, treasury gets `fee`.
/// - Fail: poster gets `amount - deduction`, treasury gets the deduction
///   (capped at `amount`).
/// - Partial `p`: worker gets `p%` of `amount` less `p%` of `fee`, treasury
///   gets that fee slice, poster gets the remainder.
pub fn compute_payout(
    amount: Amount,
    fee: Amount,
    outcome: &Outcome,
    fail_deduction: Amount,
) -> Result<Payout, EscrowError> {
    if fee > amount {
        return Err(EscrowError::Overflow);
    }
    let payout = match outcome.verdict {
        Verdict::Pass => Payout {
            worker: amount - fee,
            poster: Amount::ZERO,
            treasury: fee,
        },
        Verdict::Fail => {
            let deduction = fail_deduction.min(amount);
            Payout {
                worker: Amount::ZERO,
                poster: amount - deduction,
                treasury: deduction,
            }
        }
        Verdict::Partial => {
            outcome.verdict.validate_percent(outcome.partial_percent)?;
            let pct = outcome.partial_percent;
            let gross = amount.mul_percent(pct).ok_or(EscrowError::Overflow)?;
            let fee_slice = fee.mul_percent(pct).ok_or(EscrowError::Overflow)?;
            Payout {
                worker: gross.checked_sub(fee_slice).ok_or(EscrowError::Overflow)?,
                poster: amount - gross,
                treasury: fee_slice,
            }
        }
    };
    debug_assert_eq!(payout.total(), Some(amount));
    Ok(payout)
}

/// Result of counting a round's ballots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tally {
    Supermajority(Outcome),
    NoSupermajority {
        pass: usize,
        fail: usize,
        partial: usize,
    },
}

/// Count ballots and look for a verdict with at least `threshold` votes.
///
/// A partial supermajority settles at the floor of the mean percentage of
/// its partial voters, which always stays inside `1..=99`.
pub fn tally(ballots: &[Ballot], threshold: usize) -> Tally {
    let count = |v: Verdict| ballots.iter().filter(|b| b.verdict == v).count();
    let (pass, fail, partial) = (count(Verdict::Pass), count(Verdict::Fail), count(Verdict::Partial));
    if threshold == 0 {
        return Tally::NoSupermajority { pass, fail, partial };
    }
    if pass >= threshold {
        return Tally::Supermajority(Outcome::pass());
    }
    if fail >= threshold {
        return Tally::Supermajority(Outcome::fail());
    }
    if partial >= threshold {
        let sum: u32 = ballots
            .iter()
            .filter(|b| b.verdict == Verdict::Partial)
            .map(|b| b.partial_percent as u32)
            .sum();
        let mean = (sum / partial as u32) as u8;
        if let Ok(outcome) = Outcome::new(Verdict::Partial, mean) {
            return Tally::Supermajority(outcome);
        }
    }
    Tally::NoSupermajority { pass, fail, partial }
}

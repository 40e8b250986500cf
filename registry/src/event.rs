//! Registry events forming part of the audit trail.

use serde::{Deserialize, Serialize};
use tribunal_types::{AccountId, Amount};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// Stake fell below the minimum.
    StakeBelowMinimum,
    /// Reputation fell below the low-water mark.
    ReputationBelowLowWater,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    Registered {
        participant: AccountId,
        stake: Amount,
    },
    StakeIncreased {
        participant: AccountId,
        amount: Amount,
        total: Amount,
    },
    StakeWithdrawn {
        participant: AccountId,
        amount: Amount,
        remaining: Amount,
    },
    ReputationChanged {
        participant: AccountId,
        from: u32,
        to: u32,
    },
    Slashed {
        participant: AccountId,
        amount: Amount,
        reputation: u32,
    },
    Deactivated {
        participant: AccountId,
        reason: DeactivationReason,
    },
    Reactivated {
        participant: AccountId,
    },
}

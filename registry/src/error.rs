use thiserror::Error;
use tribunal_types::AccountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("participant {0} is already registered")]
    AlreadyRegistered(AccountId),

    #[error("participant {0} is not registered")]
    NotRegistered(AccountId),

    #[error("stake below minimum: needed {needed}, provided {provided}")]
    StakeBelowMinimum { needed: u128, provided: u128 },

    #[error("insufficient stake: requested {requested}, available {available}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("participant {0} is already active")]
    AlreadyActive(AccountId),

    #[error("cannot reactivate: stake {stake} (min {min_stake}), reputation {reputation} (min {min_reputation})")]
    ReactivationDenied {
        stake: u128,
        min_stake: u128,
        reputation: u32,
        min_reputation: u32,
    },

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}

impl RegistryError {
    /// Stable reason code for external tooling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered(_) => "registry_already_registered",
            Self::NotRegistered(_) => "registry_not_registered",
            Self::StakeBelowMinimum { .. } => "registry_stake_below_minimum",
            Self::InsufficientStake { .. } => "registry_insufficient_stake",
            Self::ZeroAmount => "registry_zero_amount",
            Self::AlreadyActive(_) => "registry_already_active",
            Self::ReactivationDenied { .. } => "registry_reactivation_denied",
            Self::Overflow => "registry_overflow",
        }
    }
}

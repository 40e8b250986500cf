//! Escrowed amounts and the assets they are denominated in.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! Fee arithmetic uses basis points and always rounds down, so any rounding
//! remainder stays with the party receiving "the rest".

use crate::address::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// 100% expressed in basis points.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// An amount of some asset, in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `self * bps / 10_000`, rounded down. `None` on overflow.
    pub fn mul_bps(self, bps: u32) -> Option<Self> {
        self.0
            .checked_mul(bps as u128)
            .map(|v| Self(v / BPS_DENOMINATOR))
    }

    /// `self * percent / 100`, rounded down. `None` on overflow.
    pub fn mul_percent(self, percent: u8) -> Option<Self> {
        self.0.checked_mul(percent as u128).map(|v| Self(v / 100))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The asset a case is funded in and paid out with.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The execution environment's native asset.
    Native,
    /// A fungible token identified by its contract/issuer account.
    Token(AccountId),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token(id) => write!(f, "token:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_rounds_down() {
        assert_eq!(Amount::new(1000).mul_bps(200), Some(Amount::new(20)));
        assert_eq!(Amount::new(99).mul_bps(200), Some(Amount::new(1)));
        assert_eq!(Amount::new(49).mul_bps(200), Some(Amount::ZERO));
    }

    #[test]
    fn percent_of_amount() {
        assert_eq!(Amount::new(1000).mul_percent(40), Some(Amount::new(400)));
        assert_eq!(Amount::new(3).mul_percent(50), Some(Amount::new(1)));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(Amount::new(u128::MAX).mul_bps(2), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }
}

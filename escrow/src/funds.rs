//! The funding boundary.

use crate::error::FundsError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tribunal_types::{AccountId, Amount, Asset};

/// Moves value between accounts and escrow custody.
///
/// `collect` takes funds from an account into custody when a case opens;
/// `pay_out` releases custody to an account on withdrawal. Either call may
/// fail, and a failed call must leave balances untouched.
pub trait FundsGateway: Send + Sync {
    fn collect(&mut self, from: &AccountId, asset: &Asset, amount: Amount) -> Result<(), FundsError>;

    fn pay_out(&mut self, to: &AccountId, asset: &Asset, amount: Amount) -> Result<(), FundsError>;

    fn name(&self) -> &str;
}

/// In-memory balances per account and asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerGateway {
    balances: BTreeMap<(AccountId, Asset), Amount>,
    custody: BTreeMap<Asset, Amount>,
    /// Accounts whose payouts are refused.
    frozen: BTreeSet<AccountId>,
}

impl LedgerGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint funds into an account.
    pub fn deposit(&mut self, account: &AccountId, asset: &Asset, amount: Amount) -> Result<Amount, FundsError> {
        let entry = self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_default();
        *entry = entry.checked_add(amount).ok_or(FundsError::Overflow)?;
        Ok(*entry)
    }

    pub fn balance(&self, account: &AccountId, asset: &Asset) -> Amount {
        self.balances
            .get(&(account.clone(), asset.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Value currently held in escrow custody.
    pub fn custody(&self, asset: &Asset) -> Amount {
        self.custody.get(asset).copied().unwrap_or_default()
    }

    /// Refuse every payout to `account` until unfrozen.
    pub fn freeze(&mut self, account: &AccountId) {
        self.frozen.insert(account.clone());
    }

    pub fn unfreeze(&mut self, account: &AccountId) {
        self.frozen.remove(account);
    }
}

impl FundsGateway for LedgerGateway {
    fn collect(&mut self, from: &AccountId, asset: &Asset, amount: Amount) -> Result<(), FundsError> {
        let available = self.balance(from, asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| FundsError::InsufficientBalance {
                account: from.clone(),
                asset: asset.clone(),
                needed: amount.raw(),
                available: available.raw(),
            })?;
        let custody = self
            .custody(asset)
            .checked_add(amount)
            .ok_or(FundsError::Overflow)?;
        self.balances.insert((from.clone(), asset.clone()), remaining);
        self.custody.insert(asset.clone(), custody);
        Ok(())
    }

    fn pay_out(&mut self, to: &AccountId, asset: &Asset, amount: Amount) -> Result<(), FundsError> {
        if self.frozen.contains(to) {
            return Err(FundsError::PayoutFailed(to.clone(), "account frozen".into()));
        }
        let held = self.custody(asset);
        let custody = held
            .checked_sub(amount)
            .ok_or_else(|| FundsError::PayoutFailed(to.clone(), format!("custody holds only {held}")))?;
        let balance = self
            .balance(to, asset)
            .checked_add(amount)
            .ok_or(FundsError::Overflow)?;
        self.custody.insert(asset.clone(), custody);
        self.balances.insert((to.clone(), asset.clone()), balance);
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory-ledger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    #[test]
    fn collect_moves_into_custody() {
        let mut ledger = LedgerGateway::new();
        ledger.deposit(&alice(), &Asset::Native, Amount::new(100)).unwrap();
        ledger.collect(&alice(), &Asset::Native, Amount::new(60)).unwrap();
        assert_eq!(ledger.balance(&alice(), &Asset::Native), Amount::new(40));
        assert_eq!(ledger.custody(&Asset::Native), Amount::new(60));
    }

    #[test]
    fn collect_without_funds_fails_cleanly() {
        let mut ledger = LedgerGateway::new();
        ledger.deposit(&alice(), &Asset::Native, Amount::new(10)).unwrap();
        let err = ledger.collect(&alice(), &Asset::Native, Amount::new(11)).unwrap_err();
        assert_eq!(err.code(), "funds_insufficient_balance");
        assert_eq!(ledger.balance(&alice(), &Asset::Native), Amount::new(10));
    }

    #[test]
    fn assets_are_kept_apart() {
        let token = Asset::Token(AccountId::new("usdc"));
        let mut ledger = LedgerGateway::new();
        ledger.deposit(&alice(), &token, Amount::new(50)).unwrap();
        assert!(ledger.collect(&alice(), &Asset::Native, Amount::new(1)).is_err());
        ledger.collect(&alice(), &token, Amount::new(50)).unwrap();
        assert_eq!(ledger.custody(&token), Amount::new(50));
        assert_eq!(ledger.custody(&Asset::Native), Amount::ZERO);
    }

    #[test]
    fn frozen_payout_fails() {
        let mut ledger = LedgerGateway::new();
        ledger.deposit(&alice(), &Asset::Native, Amount::new(10)).unwrap();
        ledger.collect(&alice(), &Asset::Native, Amount::new(10)).unwrap();
        ledger.freeze(&alice());
        let err = ledger.pay_out(&alice(), &Asset::Native, Amount::new(10)).unwrap_err();
        assert_eq!(err.code(), "funds_payout_failed");
        ledger.unfreeze(&alice());
        ledger.pay_out(&alice(), &Asset::Native, Amount::new(10)).unwrap();
        assert_eq!(ledger.balance(&alice(), &Asset::Native), Amount::new(10));
    }
}

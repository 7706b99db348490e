//! # Share Ledger
//!
//! Pure bookkeeping for ownership shares. The ledger owns two facts and
//! nothing else: the total number of shares in existence, and who holds
//! how many of them. It makes no external calls, knows nothing about
//! assets or pricing, and enforces exactly one rule: nobody burns shares
//! they do not hold.
//!
//! That one rule is load-bearing. Burning is the *only* authorization
//! check on redemption -- there is no separate permission system for
//! withdrawals, because a caller who cannot present shares has nothing
//! to redeem. See [`ShareLedger::burn`].
//!
//! ## Invariant
//!
//! The sum of all holder balances equals `total_shares` at every
//! observable point. No shares exist outside the ledger. Both mutation
//! paths (`mint`, `burn`) touch the holder entry and the total in the
//! same call, so the invariant cannot be observed broken.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during share ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Attempted to burn more shares than the holder owns.
    ///
    /// This is the structural guard against one party redeeming another's
    /// stake: a holder with zero shares fails here for any positive amount.
    #[error("invalid share amount: holder owns {balance}, requested burn of {requested}")]
    InvalidShareAmount {
        /// The holder whose burn was rejected.
        holder: Identity,
        /// The holder's current share balance.
        balance: u64,
        /// The burn amount that was rejected.
        requested: u64,
    },
}

// ---------------------------------------------------------------------------
// ShareLedger
// ---------------------------------------------------------------------------

/// Total shares issued plus the per-holder breakdown.
///
/// Exclusively owned and mutated by the vault core. Serializable so a
/// vault snapshot captures the full cap table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareLedger {
    /// Per-holder share balances. Entries may sit at zero after a full
    /// redemption; queries and snapshots filter them out.
    #[serde(with = "crate::identity::identity_map")]
    holdings: HashMap<Identity, u64>,

    /// Total shares in existence. Always equals the sum of `holdings`.
    total_shares: u64,
}

impl ShareLedger {
    /// Creates an empty ledger with zero shares issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of shares in existence.
    pub fn total_shares(&self) -> u64 {
        self.total_shares
    }

    /// Returns a holder's share balance. Unknown holders hold zero.
    pub fn balance_of(&self, holder: &Identity) -> u64 {
        self.holdings.get(holder).copied().unwrap_or(0)
    }

    /// Returns all non-zero holdings as `(Identity, shares)` pairs.
    pub fn holders(&self) -> Vec<(Identity, u64)> {
        self.holdings
            .iter()
            .filter(|(_, shares)| **shares > 0)
            .map(|(id, shares)| (*id, *shares))
            .collect()
    }

    /// Issues `share_amount` new shares to `holder`.
    ///
    /// Infallible in the accounting sense: there is no cap on issuance.
    /// Overflow of the `u64` share supply is a fatal defect, not an error
    /// a caller could meaningfully handle, and aborts the process.
    pub fn mint(&mut self, holder: &Identity, share_amount: u64) {
        let entry = self.holdings.entry(*holder).or_insert(0);
        *entry = entry
            .checked_add(share_amount)
            .expect("share balance overflow: fatal accounting defect");
        self.total_shares = self
            .total_shares
            .checked_add(share_amount)
            .expect("share supply overflow: fatal accounting defect");
    }

    /// Destroys `share_amount` shares held by `holder`.
    ///
    /// Returns the holder's remaining balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidShareAmount`] if `share_amount`
    /// exceeds the holder's current balance. Nothing is mutated on
    /// failure.
    pub fn burn(&mut self, holder: &Identity, share_amount: u64) -> Result<u64, LedgerError> {
        let balance = self.balance_of(holder);
        if share_amount > balance {
            return Err(LedgerError::InvalidShareAmount {
                holder: *holder,
                balance,
                requested: share_amount,
            });
        }

        let remaining = balance - share_amount;
        self.holdings.insert(*holder, remaining);
        self.total_shares -= share_amount;
        Ok(remaining)
    }

    /// Verifies the conservation invariant: sum of holdings == total.
    ///
    /// O(holders). Called from tests and debug assertions, not from the
    /// hot path -- the operations maintain the invariant by construction.
    pub fn is_balanced(&self) -> bool {
        let sum: u128 = self.holdings.values().map(|s| *s as u128).sum();
        sum == self.total_shares as u128
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::derive("alice")
    }

    fn bob() -> Identity {
        Identity::derive("bob")
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = ShareLedger::new();
        assert_eq!(ledger.total_shares(), 0);
        assert_eq!(ledger.balance_of(&alice()), 0);
        assert!(ledger.holders().is_empty());
        assert!(ledger.is_balanced());
    }

    #[test]
    fn mint_credits_holder_and_total() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 500);

        assert_eq!(ledger.balance_of(&alice()), 500);
        assert_eq!(ledger.total_shares(), 500);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn mint_accumulates_across_holders() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 300);
        ledger.mint(&bob(), 200);
        ledger.mint(&alice(), 100);

        assert_eq!(ledger.balance_of(&alice()), 400);
        assert_eq!(ledger.balance_of(&bob()), 200);
        assert_eq!(ledger.total_shares(), 600);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn burn_reduces_holder_and_total() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 500);

        let remaining = ledger.burn(&alice(), 200).expect("burn");
        assert_eq!(remaining, 300);
        assert_eq!(ledger.balance_of(&alice()), 300);
        assert_eq!(ledger.total_shares(), 300);
        assert!(ledger.is_balanced());
    }

    #[test]
    fn burn_to_zero_removes_from_holders_listing() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 500);
        ledger.burn(&alice(), 500).expect("burn");

        assert_eq!(ledger.balance_of(&alice()), 0);
        assert_eq!(ledger.total_shares(), 0);
        assert!(ledger.holders().is_empty());
    }

    #[test]
    fn burn_exceeding_balance_rejected_without_mutation() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 100);

        let result = ledger.burn(&alice(), 101);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidShareAmount {
                balance: 100,
                requested: 101,
                ..
            })
        ));
        assert_eq!(ledger.balance_of(&alice()), 100);
        assert_eq!(ledger.total_shares(), 100);
    }

    #[test]
    fn burn_by_stranger_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 500);

        let result = ledger.burn(&bob(), 1);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidShareAmount { balance: 0, .. })
        ));
        assert!(ledger.is_balanced());
    }

    #[test]
    fn ledger_serialization_roundtrip() {
        let mut ledger = ShareLedger::new();
        ledger.mint(&alice(), 750);
        ledger.mint(&bob(), 250);

        let json = serde_json::to_string(&ledger).expect("serialize");
        let recovered: ShareLedger = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(recovered.total_shares(), 1000);
        assert_eq!(recovered.balance_of(&alice()), 750);
        assert!(recovered.is_balanced());
    }
}

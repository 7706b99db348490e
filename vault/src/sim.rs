//! # In-Memory Collaborator Stand-ins
//!
//! Working implementations of the [`AssetLedger`] and [`YieldFacility`]
//! seams, entirely in memory. The vault core is specified to be correct
//! against *any* implementation of those contracts; these are the ones
//! the test suite and the CLI demo drive it with.
//!
//! They live in the library rather than behind `cfg(test)` because the
//! demo binary needs them too, and because a downstream crate evaluating
//! the vault deserves a ready-made sandbox.
//!
//! Both types take `&self` on every method and carry their own
//! `parking_lot` locking, so one instance can be shared via `Arc`
//! between the vault and the harness inspecting it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::facility::{AssetError, AssetLedger, FacilityError, YieldFacility};
use crate::identity::Identity;

// ---------------------------------------------------------------------------
// InMemoryAssetLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct AssetBooks {
    balances: HashMap<Identity, u64>,
    /// owner -> spender -> approved amount.
    allowances: HashMap<Identity, HashMap<Identity, u64>>,
}

/// A fungible-token ledger with mint, transfer, and allowance semantics.
///
/// Total supply is conserved across transfers and grows only through
/// [`mint`](InMemoryAssetLedger::mint), the simulation's faucet.
#[derive(Debug, Default)]
pub struct InMemoryAssetLedger {
    books: RwLock<AssetBooks>,
}

impl InMemoryAssetLedger {
    /// Creates an empty ledger with zero supply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` new tokens in `to`'s account. Simulation faucet;
    /// a real asset ledger mints under its own rules.
    pub fn mint(&self, to: &Identity, amount: u64) {
        let mut books = self.books.write();
        let entry = books.balances.entry(*to).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .expect("asset supply overflow in simulation");
    }

    /// Total tokens in existence across all accounts.
    pub fn total_supply(&self) -> u64 {
        self.books
            .read()
            .balances
            .values()
            .fold(0u64, |acc, b| acc.checked_add(*b).expect("supply overflow"))
    }

    /// Remaining allowance `owner` has granted `spender`.
    pub fn allowance(&self, owner: &Identity, spender: &Identity) -> u64 {
        self.books
            .read()
            .allowances
            .get(owner)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn move_tokens(
        books: &mut AssetBooks,
        from: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<(), AssetError> {
        let available = books.balances.get(from).copied().unwrap_or(0);
        if amount > available {
            return Err(AssetError::InsufficientBalance {
                holder: *from,
                available,
                requested: amount,
            });
        }
        *books.balances.entry(*from).or_insert(0) -= amount;
        let dest = books.balances.entry(*to).or_insert(0);
        *dest = dest
            .checked_add(amount)
            .expect("asset balance overflow in simulation");
        Ok(())
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), AssetError> {
        let mut books = self.books.write();
        Self::move_tokens(&mut books, from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Identity,
        from: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<(), AssetError> {
        let mut books = self.books.write();

        let approved = books
            .allowances
            .get(from)
            .and_then(|per_spender| per_spender.get(spender))
            .copied()
            .unwrap_or(0);
        if amount > approved {
            return Err(AssetError::InsufficientAllowance {
                spender: *spender,
                approved,
                requested: amount,
            });
        }

        Self::move_tokens(&mut books, from, to, amount)?;
        // Only consume the allowance once the transfer has landed.
        if let Some(entry) = books
            .allowances
            .get_mut(from)
            .and_then(|per_spender| per_spender.get_mut(spender))
        {
            *entry -= amount;
        }
        Ok(())
    }

    fn approve(&self, owner: &Identity, spender: &Identity, amount: u64) {
        let mut books = self.books.write();
        books
            .allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
        debug!(owner = %owner, spender = %spender, amount, "allowance set");
    }

    fn balance_of(&self, holder: &Identity) -> u64 {
        self.books.read().balances.get(holder).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// SimYieldFacility
// ---------------------------------------------------------------------------

/// A yield facility that actually holds tokens on the asset ledger.
///
/// Supplied capital is transferred into the facility's own account and
/// recorded as a per-supplier position. Profit is credited with
/// [`credit_profit`](SimYieldFacility::credit_profit): the position grows,
/// nothing is pushed to the supplier -- exactly the asynchronous profit
/// model the vault's `observe_facility_profit` reconciles against. The
/// tokens backing credited profit must be minted into the facility's
/// account separately, or the eventual recall will fail at settlement.
#[derive(Debug)]
pub struct SimYieldFacility<L: AssetLedger> {
    /// The facility's own account on the asset ledger.
    identity: Identity,
    asset: Arc<L>,
    positions: RwLock<HashMap<Identity, u64>>,
}

impl<L: AssetLedger> SimYieldFacility<L> {
    /// Creates a facility bound to its account on the given asset ledger.
    pub fn new(identity: Identity, asset: Arc<L>) -> Self {
        Self {
            identity,
            asset,
            positions: RwLock::new(HashMap::new()),
        }
    }

    /// The facility's own identity on the asset ledger.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Credits `amount` of profit to `beneficiary`'s position.
    ///
    /// Simulation hook mirroring an interest accrual event: the
    /// facility's belief about the position grows without any transfer
    /// toward the beneficiary.
    pub fn credit_profit(&self, beneficiary: &Identity, amount: u64) {
        let mut positions = self.positions.write();
        let entry = positions.entry(*beneficiary).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .expect("facility position overflow in simulation");
        debug!(beneficiary = %beneficiary, amount, "profit credited");
    }
}

impl<L: AssetLedger> YieldFacility for SimYieldFacility<L> {
    fn supply(&self, from: &Identity, amount: u64) -> Result<(), FacilityError> {
        self.asset.transfer(from, &self.identity, amount)?;
        let mut positions = self.positions.write();
        let entry = positions.entry(*from).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .expect("facility position overflow in simulation");
        Ok(())
    }

    fn withdraw(&self, to: &Identity, amount: u64) -> Result<(), FacilityError> {
        {
            let positions = self.positions.read();
            let available = positions.get(to).copied().unwrap_or(0);
            if amount > available {
                return Err(FacilityError::LiquidityUnavailable {
                    available,
                    requested: amount,
                });
            }
        }

        // Settle first; only debit the position once tokens have moved.
        self.asset.transfer(&self.identity, to, amount)?;
        let mut positions = self.positions.write();
        *positions.entry(*to).or_insert(0) -= amount;
        Ok(())
    }

    fn balance_of(&self, holder: &Identity) -> u64 {
        self.positions.read().get(holder).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! # The Vault Core
//!
//! Pooled-capital accounting: depositors contribute the base asset and
//! receive proportional ownership shares; the operator may redirect idle
//! capital to an external yield facility and later recall it; withdrawals
//! redeem shares for a proportional claim on everything the vault tracks,
//! including profit accrued externally.
//!
//! ## Ordering discipline
//!
//! Every operation re-reads the state it prices against at invocation
//! time -- no priced quantity survives across a call into a collaborator.
//! Internal accounting is brought to its post-operation value *before*
//! the external settlement call is issued, so a collaborator that calls
//! back into the vault during settlement observes a consistent,
//! already-updated ledger. If the settlement call itself fails, the
//! internal mutation is compensated before the error is returned: a
//! failed operation leaves zero observable mutation behind.
//!
//! The one exception is recalling capital from the facility, where the
//! external pull must land before the books move -- the facility, not
//! the vault, decides whether the liquidity exists.
//!
//! ## What is a pricing event
//!
//! Deposits and withdrawals are. Capital allocation moves (supply to /
//! recall from the facility) are not: they shuffle value between `idle`
//! and `deployed` without changing `total_assets` or any share balance.
//! Externally credited profit enters the price only through
//! [`Vault::observe_facility_profit`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::facility::{AssetError, AssetLedger, FacilityError, YieldFacility};
use crate::guard::{AccessGuard, GuardError, Phase};
use crate::identity::Identity;
use crate::ledger::{LedgerError, ShareLedger};
use crate::pricing;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the vault's public operations.
///
/// Every variant is a deterministic, precondition-checked failure. None
/// are retried internally; a caller who wants a retry issues a fresh
/// call against fresh state.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A zero-amount deposit or withdrawal, which is a no-op and almost
    /// certainly a bug in the caller.
    #[error("zero-amount operations are not permitted")]
    ZeroAmount,

    /// Idle assets cannot cover the requested withdrawal or allocation.
    /// Recalling capital from the facility is an explicit operator
    /// action, never an automatic side effect of a withdrawal.
    #[error("insufficient idle liquidity: idle {idle}, requested {requested}")]
    InsufficientLiquidity {
        /// Idle assets currently held.
        idle: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// A share ledger operation failed (burn exceeding balance).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// An authorization or lifecycle check failed.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The asset ledger rejected a settlement transfer.
    #[error("asset ledger: {0}")]
    Asset(#[from] AssetError),

    /// The yield facility rejected an allocation call.
    #[error("yield facility: {0}")]
    Facility(#[from] FacilityError),
}

// ---------------------------------------------------------------------------
// AssetBook
// ---------------------------------------------------------------------------

/// The vault's view of total assets under management.
///
/// `idle` is held directly and redeemable immediately; `deployed` is the
/// cached belief about the vault's position at the yield facility, which
/// may lag behind the facility's own books until the next profit
/// observation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct AssetBook {
    idle: u64,
    deployed: u64,
}

impl AssetBook {
    /// Assets held directly by the vault.
    pub fn idle_assets(&self) -> u64 {
        self.idle
    }

    /// Assets attributed to the vault at the facility.
    pub fn deployed_assets(&self) -> u64 {
        self.deployed
    }

    /// Idle plus deployed. The denominator of every price quote.
    pub fn total_assets(&self) -> u64 {
        self.idle
            .checked_add(self.deployed)
            .expect("asset total overflow: fatal accounting defect")
    }

    fn credit_idle(&mut self, amount: u64) {
        self.idle = self
            .idle
            .checked_add(amount)
            .expect("idle asset overflow: fatal accounting defect");
    }

    fn debit_idle(&mut self, amount: u64) {
        debug_assert!(amount <= self.idle);
        self.idle -= amount;
    }

    fn deploy(&mut self, amount: u64) {
        debug_assert!(amount <= self.idle);
        self.idle -= amount;
        self.deployed = self
            .deployed
            .checked_add(amount)
            .expect("deployed asset overflow: fatal accounting defect");
    }

    /// Books a successful recall. Recalling more than the cached
    /// `deployed` figure realizes profit the vault had not yet observed,
    /// so the deployed side saturates at zero rather than underflowing.
    fn recall(&mut self, amount: u64) {
        self.deployed = self.deployed.saturating_sub(amount);
        self.credit_idle(amount);
    }

    fn mark_deployed(&mut self, reported: u64) {
        debug_assert!(reported >= self.deployed);
        self.deployed = reported;
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Returned by [`Vault::deposit`] with the priced outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// Unique receipt identifier.
    pub id: Uuid,
    /// The depositor.
    pub holder: Identity,
    /// Assets pulled from the depositor.
    pub amount: u64,
    /// Shares minted in exchange.
    pub shares_minted: u64,
    /// When the deposit settled (UTC).
    pub timestamp: DateTime<Utc>,
}

/// Returned by [`Vault::withdraw`] with the priced outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    /// Unique receipt identifier.
    pub id: Uuid,
    /// The redeeming holder.
    pub holder: Identity,
    /// Shares burned.
    pub shares_burned: u64,
    /// Assets returned to the holder.
    pub assets_returned: u64,
    /// When the withdrawal settled (UTC).
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A serializable point-in-time view of the full vault state, for
/// inspection and persistence. Produced by [`Vault::snapshot`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// The vault's own identity on the asset ledger.
    pub identity: Identity,
    /// Lifecycle phase.
    pub phase: Phase,
    /// The bound operator, when active.
    pub operator: Option<Identity>,
    /// Assets held directly.
    pub idle_assets: u64,
    /// Assets attributed to the facility position.
    pub deployed_assets: u64,
    /// Total shares in existence.
    pub total_shares: u64,
    /// Fixed-point price-per-share (see [`crate::config::PRICE_SCALE`]),
    /// absent during bootstrap.
    pub price_per_share: Option<u128>,
    /// All non-zero holdings.
    pub holders: Vec<(Identity, u64)>,
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// The pooled-capital vault: share ledger, asset book, access guard, and
/// the two collaborator seams, composed behind one mutation boundary.
///
/// All state transitions execute one at a time to completion behind
/// `&mut self`; ordering between callers is whatever the surrounding
/// environment imposes, and every operation is correct under any such
/// ordering because it re-reads all state it prices against.
pub struct Vault<L: AssetLedger, F: YieldFacility> {
    /// The vault's own account on the asset ledger. Deposits land here,
    /// withdrawals leave from here.
    identity: Identity,
    ledger: ShareLedger,
    book: AssetBook,
    guard: AccessGuard,
    asset: Option<Arc<L>>,
    facility: Option<Arc<F>>,
}

impl<L: AssetLedger, F: YieldFacility> Vault<L, F> {
    /// Creates an uninitialized vault with the given ledger identity.
    ///
    /// Every operation fails with `NotInitialized` until
    /// [`initialize`](Self::initialize) binds the collaborators.
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            ledger: ShareLedger::new(),
            book: AssetBook::default(),
            guard: AccessGuard::new(),
            asset: None,
            facility: None,
        }
    }

    /// Binds the asset ledger, yield facility, and operator, exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::AlreadyInitialized`] on any call after the
    /// first; the original bindings are untouched.
    pub fn initialize(
        &mut self,
        facility: Arc<F>,
        asset: Arc<L>,
        operator: Identity,
    ) -> Result<(), VaultError> {
        self.guard.initialize(operator)?;
        self.asset = Some(asset);
        self.facility = Some(facility);
        info!(vault = %self.identity, operator = %operator, "vault initialized");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Self-service operations
    // -----------------------------------------------------------------------

    /// Deposits `amount` of the base asset on behalf of `caller`,
    /// minting proportional shares.
    ///
    /// The caller must have approved the vault's identity on the asset
    /// ledger for at least `amount` beforehand. Accounting is updated
    /// before the pull is issued; a failed pull rolls the accounting
    /// back and returns the transfer error.
    ///
    /// # Errors
    ///
    /// [`VaultError::ZeroAmount`] for a zero deposit,
    /// [`GuardError::NotInitialized`] before initialization, and
    /// [`VaultError::Asset`] when the settlement pull fails.
    pub fn deposit(
        &mut self,
        caller: &Identity,
        amount: u64,
    ) -> Result<DepositReceipt, VaultError> {
        self.guard.require_active()?;
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let asset = Arc::clone(self.asset.as_ref().ok_or(GuardError::NotInitialized)?);

        let shares = pricing::shares_for_deposit(
            amount,
            self.ledger.total_shares(),
            self.book.total_assets(),
        );
        debug!(
            holder = %caller,
            amount,
            shares,
            total_shares = self.ledger.total_shares(),
            total_assets = self.book.total_assets(),
            "deposit priced"
        );

        // Effects before interaction: a reentrant call during the pull
        // observes the post-deposit totals.
        self.book.credit_idle(amount);
        self.ledger.mint(caller, shares);

        if let Err(err) = asset.transfer_from(&self.identity, caller, &self.identity, amount) {
            self.book.debit_idle(amount);
            self.ledger
                .burn(caller, shares)
                .expect("rollback of freshly minted shares cannot fail");
            return Err(err.into());
        }

        info!(holder = %caller, amount, shares, "deposit settled");
        Ok(DepositReceipt {
            id: Uuid::new_v4(),
            holder: *caller,
            amount,
            shares_minted: shares,
            timestamp: Utc::now(),
        })
    }

    /// Redeems `share_amount` of `caller`'s shares for a proportional
    /// claim on total assets, paid from idle liquidity.
    ///
    /// Priced against the pre-burn totals. Strict-fail policy: when idle
    /// liquidity cannot cover the owed amount the call fails; it never
    /// pulls from the facility implicitly.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidShareAmount`] when `share_amount` exceeds
    /// the caller's balance (the sole redemption authorization check),
    /// [`VaultError::InsufficientLiquidity`] when idle assets cannot
    /// cover the owed amount, [`VaultError::ZeroAmount`] for a zero
    /// redemption.
    pub fn withdraw(
        &mut self,
        caller: &Identity,
        share_amount: u64,
    ) -> Result<WithdrawReceipt, VaultError> {
        self.guard.require_active()?;
        if share_amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let asset = Arc::clone(self.asset.as_ref().ok_or(GuardError::NotInitialized)?);

        // Price strictly before the burn, from the pre-burn totals.
        let total_shares = self.ledger.total_shares();
        let total_assets = self.book.total_assets();
        let balance = self.ledger.balance_of(caller);
        if share_amount > balance {
            return Err(LedgerError::InvalidShareAmount {
                holder: *caller,
                balance,
                requested: share_amount,
            }
            .into());
        }
        let owed = pricing::assets_for_shares(share_amount, total_shares, total_assets);
        debug!(
            holder = %caller,
            share_amount,
            owed,
            total_shares,
            total_assets,
            "withdrawal priced"
        );

        if owed > self.book.idle_assets() {
            return Err(VaultError::InsufficientLiquidity {
                idle: self.book.idle_assets(),
                requested: owed,
            });
        }

        // Effects before interaction: burn and debit both land before
        // the asset leaves the vault.
        self.ledger.burn(caller, share_amount)?;
        self.book.debit_idle(owed);

        if let Err(err) = asset.transfer(&self.identity, caller, owed) {
            self.ledger.mint(caller, share_amount);
            self.book.credit_idle(owed);
            return Err(err.into());
        }

        info!(holder = %caller, share_amount, owed, "withdrawal settled");
        Ok(WithdrawReceipt {
            id: Uuid::new_v4(),
            holder: *caller,
            shares_burned: share_amount,
            assets_returned: owed,
            timestamp: Utc::now(),
        })
    }

    // -----------------------------------------------------------------------
    // Privileged operations
    // -----------------------------------------------------------------------

    /// Moves `amount` of idle capital out to the yield facility.
    ///
    /// Operator only. Asset allocation, never a pricing event: total
    /// assets and every share balance are unchanged.
    ///
    /// # Errors
    ///
    /// [`GuardError::Unauthorized`] for non-operator callers,
    /// [`VaultError::InsufficientLiquidity`] when `amount` exceeds idle
    /// assets, [`VaultError::Facility`] when the facility rejects the
    /// supply (accounting rolled back).
    pub fn supply_to_facility(
        &mut self,
        caller: &Identity,
        amount: u64,
    ) -> Result<(), VaultError> {
        self.guard.require_operator(caller)?;
        let facility = Arc::clone(self.facility.as_ref().ok_or(GuardError::NotInitialized)?);

        if amount > self.book.idle_assets() {
            return Err(VaultError::InsufficientLiquidity {
                idle: self.book.idle_assets(),
                requested: amount,
            });
        }

        self.book.deploy(amount);
        if let Err(err) = facility.supply(&self.identity, amount) {
            self.book.recall(amount);
            return Err(err.into());
        }

        info!(
            amount,
            idle = self.book.idle_assets(),
            deployed = self.book.deployed_assets(),
            "capital supplied to facility"
        );
        Ok(())
    }

    /// Recalls `amount` of deployed capital from the yield facility.
    ///
    /// Operator only. The facility decides whether the liquidity exists,
    /// so here the external pull lands first and the books move only on
    /// success; a rejected pull leaves zero mutation by construction.
    ///
    /// # Errors
    ///
    /// [`GuardError::Unauthorized`] for non-operator callers,
    /// [`FacilityError::LiquidityUnavailable`] propagated when the
    /// facility cannot return the requested amount.
    pub fn withdraw_from_facility(
        &mut self,
        caller: &Identity,
        amount: u64,
    ) -> Result<(), VaultError> {
        self.guard.require_operator(caller)?;
        let facility = Arc::clone(self.facility.as_ref().ok_or(GuardError::NotInitialized)?);

        facility.withdraw(&self.identity, amount)?;
        self.book.recall(amount);

        info!(
            amount,
            idle = self.book.idle_assets(),
            deployed = self.book.deployed_assets(),
            "capital recalled from facility"
        );
        Ok(())
    }

    /// Reconciles the cached facility position against the facility's
    /// own report, absorbing externally credited profit into the books.
    ///
    /// Returns the newly observed profit (zero when the report does not
    /// exceed the cache). This is the only path by which profit enters
    /// `price_per_share`; no asset moves.
    pub fn observe_facility_profit(&mut self) -> Result<u64, VaultError> {
        self.guard.require_active()?;
        let facility = Arc::clone(self.facility.as_ref().ok_or(GuardError::NotInitialized)?);

        let reported = facility.balance_of(&self.identity);
        let cached = self.book.deployed_assets();
        if reported <= cached {
            return Ok(0);
        }

        let profit = reported - cached;
        self.book.mark_deployed(reported);
        info!(
            profit,
            deployed = reported,
            "facility profit observed"
        );
        Ok(profit)
    }

    // -----------------------------------------------------------------------
    // Read-only queries
    // -----------------------------------------------------------------------

    /// The vault's own identity on the asset ledger.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// A holder's share balance. Unknown holders hold zero.
    pub fn balance_of(&self, holder: &Identity) -> u64 {
        self.ledger.balance_of(holder)
    }

    /// Total shares in existence.
    pub fn total_shares(&self) -> u64 {
        self.ledger.total_shares()
    }

    /// Idle plus deployed assets, as tracked.
    pub fn total_assets(&self) -> u64 {
        self.book.total_assets()
    }

    /// Assets held directly, redeemable immediately.
    pub fn idle_assets(&self) -> u64 {
        self.book.idle_assets()
    }

    /// Assets attributed to the facility position.
    pub fn deployed_assets(&self) -> u64 {
        self.book.deployed_assets()
    }

    /// Fixed-point price-per-share, `None` during bootstrap.
    pub fn price_per_share(&self) -> Option<u128> {
        pricing::price_per_share(self.ledger.total_shares(), self.book.total_assets())
    }

    /// Point-in-time view of the full vault state.
    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            identity: self.identity,
            phase: self.guard.phase(),
            operator: self.guard.operator().copied(),
            idle_assets: self.book.idle_assets(),
            deployed_assets: self.book.deployed_assets(),
            total_shares: self.ledger.total_shares(),
            price_per_share: self.price_per_share(),
            holders: self.ledger.holders(),
        }
    }

    /// Verifies the share conservation invariant. Test and debug aid.
    pub fn is_balanced(&self) -> bool {
        self.ledger.is_balanced()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{InMemoryAssetLedger, SimYieldFacility};

    type SimVault = Vault<InMemoryAssetLedger, SimYieldFacility<InMemoryAssetLedger>>;

    struct Harness {
        asset: Arc<InMemoryAssetLedger>,
        facility: Arc<SimYieldFacility<InMemoryAssetLedger>>,
        vault: SimVault,
        operator: Identity,
    }

    /// Initialized vault wired against fresh in-memory collaborators.
    fn harness() -> Harness {
        let asset = Arc::new(InMemoryAssetLedger::new());
        let facility = Arc::new(SimYieldFacility::new(
            Identity::derive("sim-facility"),
            Arc::clone(&asset),
        ));
        let operator = Identity::derive("operator");
        let mut vault = Vault::new(Identity::derive("vault"));
        vault
            .initialize(Arc::clone(&facility), Arc::clone(&asset), operator)
            .expect("initialize");
        Harness {
            asset,
            facility,
            vault,
            operator,
        }
    }

    /// Mints tokens to a depositor and approves the vault to pull them.
    fn fund(h: &Harness, who: &Identity, amount: u64) {
        h.asset.mint(who, amount);
        h.asset.approve(who, h.vault.identity(), amount);
    }

    #[test]
    fn operations_before_initialize_rejected() {
        let mut vault: SimVault = Vault::new(Identity::derive("vault"));
        let alice = Identity::derive("alice");

        assert!(matches!(
            vault.deposit(&alice, 100),
            Err(VaultError::Guard(GuardError::NotInitialized))
        ));
        assert!(matches!(
            vault.withdraw(&alice, 100),
            Err(VaultError::Guard(GuardError::NotInitialized))
        ));
        assert!(matches!(
            vault.supply_to_facility(&alice, 100),
            Err(VaultError::Guard(GuardError::NotInitialized))
        ));
    }

    #[test]
    fn reinitialization_rejected() {
        let mut h = harness();
        let result = h.vault.initialize(
            Arc::clone(&h.facility),
            Arc::clone(&h.asset),
            Identity::derive("usurper"),
        );
        assert!(matches!(
            result,
            Err(VaultError::Guard(GuardError::AlreadyInitialized))
        ));
        assert_eq!(h.vault.snapshot().operator, Some(h.operator));
    }

    #[test]
    fn bootstrap_deposit_mints_one_to_one() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);

        let receipt = h.vault.deposit(&alice, 500).expect("deposit");
        assert_eq!(receipt.shares_minted, 500);
        assert_eq!(h.vault.balance_of(&alice), 500);
        assert_eq!(h.vault.idle_assets(), 500);
        assert_eq!(h.vault.total_assets(), 500);
        assert_eq!(h.asset.balance_of(h.vault.identity()), 500);
        assert!(h.vault.is_balanced());
    }

    #[test]
    fn zero_deposit_rejected() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        assert!(matches!(
            h.vault.deposit(&alice, 0),
            Err(VaultError::ZeroAmount)
        ));
    }

    #[test]
    fn deposit_without_allowance_leaves_no_mutation() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        h.asset.mint(&alice, 1000);
        // No approve call: the settlement pull must fail.

        let result = h.vault.deposit(&alice, 500);
        assert!(matches!(
            result,
            Err(VaultError::Asset(AssetError::InsufficientAllowance { .. }))
        ));
        assert_eq!(h.vault.total_shares(), 0);
        assert_eq!(h.vault.total_assets(), 0);
        assert_eq!(h.vault.balance_of(&alice), 0);
        assert_eq!(h.asset.balance_of(&alice), 1000);
    }

    #[test]
    fn no_profit_round_trip_returns_exact_deposit() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);

        h.vault.deposit(&alice, 700).expect("deposit");
        let receipt = h.vault.withdraw(&alice, 700).expect("withdraw");

        assert_eq!(receipt.assets_returned, 700);
        assert_eq!(h.asset.balance_of(&alice), 1000);
        assert_eq!(h.vault.total_shares(), 0);
        assert_eq!(h.vault.total_assets(), 0);
    }

    #[test]
    fn zero_withdraw_rejected() {
        let mut h = harness();
        assert!(matches!(
            h.vault.withdraw(&Identity::derive("alice"), 0),
            Err(VaultError::ZeroAmount)
        ));
    }

    #[test]
    fn withdraw_beyond_share_balance_rejected() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        let mallory = Identity::derive("mallory");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 500).expect("deposit");

        let result = h.vault.withdraw(&mallory, 500);
        assert!(matches!(
            result,
            Err(VaultError::Ledger(LedgerError::InvalidShareAmount { .. }))
        ));
        // Vault state unchanged by the rejected attempt.
        assert_eq!(h.vault.total_shares(), 500);
        assert_eq!(h.vault.idle_assets(), 500);
    }

    #[test]
    fn withdraw_exceeding_idle_liquidity_rejected() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");
        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 800).expect("supply");

        // 1000 shares are worth 1000 assets, but only 200 are idle.
        let result = h.vault.withdraw(&alice, 500);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientLiquidity {
                idle: 200,
                requested: 500,
            })
        ));
        // Shares were not burned by the failed attempt.
        assert_eq!(h.vault.balance_of(&alice), 1000);
    }

    #[test]
    fn supply_requires_operator() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");

        let result = h.vault.supply_to_facility(&alice, 100);
        assert!(matches!(
            result,
            Err(VaultError::Guard(GuardError::Unauthorized { .. }))
        ));
        assert_eq!(h.vault.idle_assets(), 1000);
    }

    #[test]
    fn supply_moves_idle_to_deployed_without_pricing() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");
        let price_before = h.vault.price_per_share();

        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 400).expect("supply");

        assert_eq!(h.vault.idle_assets(), 600);
        assert_eq!(h.vault.deployed_assets(), 400);
        assert_eq!(h.vault.total_assets(), 1000);
        assert_eq!(h.vault.total_shares(), 1000);
        assert_eq!(h.vault.price_per_share(), price_before);
        assert_eq!(h.facility.balance_of(h.vault.identity()), 400);
    }

    #[test]
    fn supply_beyond_idle_rejected() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 500);
        h.vault.deposit(&alice, 500).expect("deposit");

        let operator = h.operator;
        let result = h.vault.supply_to_facility(&operator, 501);
        assert!(matches!(
            result,
            Err(VaultError::InsufficientLiquidity { .. })
        ));
    }

    #[test]
    fn recall_requires_operator() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        let result = h.vault.withdraw_from_facility(&alice, 100);
        assert!(matches!(
            result,
            Err(VaultError::Guard(GuardError::Unauthorized { .. }))
        ));
    }

    #[test]
    fn recall_moves_deployed_back_to_idle() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");

        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 600).expect("supply");
        h.vault
            .withdraw_from_facility(&operator, 250)
            .expect("recall");

        assert_eq!(h.vault.idle_assets(), 650);
        assert_eq!(h.vault.deployed_assets(), 350);
        assert_eq!(h.vault.total_assets(), 1000);
    }

    #[test]
    fn recall_beyond_facility_position_leaves_no_mutation() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");

        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 300).expect("supply");

        let result = h.vault.withdraw_from_facility(&operator, 301);
        assert!(matches!(
            result,
            Err(VaultError::Facility(
                FacilityError::LiquidityUnavailable { .. }
            ))
        ));
        assert_eq!(h.vault.idle_assets(), 700);
        assert_eq!(h.vault.deployed_assets(), 300);
    }

    #[test]
    fn observed_profit_raises_price_per_share() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");

        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 500).expect("supply");

        h.facility.credit_profit(h.vault.identity(), 250);
        let profit = h.vault.observe_facility_profit().expect("observe");

        assert_eq!(profit, 250);
        assert_eq!(h.vault.deployed_assets(), 750);
        assert_eq!(h.vault.total_assets(), 1250);
        // 1250 assets over 1000 shares = 1.25.
        assert_eq!(h.vault.price_per_share(), Some(1_250_000));
    }

    #[test]
    fn observe_without_profit_is_a_no_op() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 1000).expect("deposit");

        let operator = h.operator;
        h.vault.supply_to_facility(&operator, 500).expect("supply");

        assert_eq!(h.vault.observe_facility_profit().expect("observe"), 0);
        assert_eq!(h.vault.deployed_assets(), 500);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut h = harness();
        let alice = Identity::derive("alice");
        fund(&h, &alice, 1000);
        h.vault.deposit(&alice, 800).expect("deposit");

        let snap = h.vault.snapshot();
        assert_eq!(snap.phase, Phase::Active);
        assert_eq!(snap.operator, Some(h.operator));
        assert_eq!(snap.idle_assets, 800);
        assert_eq!(snap.total_shares, 800);
        assert_eq!(snap.holders, vec![(alice, 800)]);

        let json = serde_json::to_string(&snap).expect("serialize");
        let recovered: VaultSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(recovered.total_shares, 800);
    }
}

//! # Collaborator Boundaries
//!
//! The vault core trusts exactly two external systems, and talks to each
//! through a narrow capability trait:
//!
//! - [`AssetLedger`] -- the fungible base-asset ledger. Conventional
//!   transfer / approve / balance semantics with conserved total supply.
//! - [`YieldFacility`] -- the external yield-generating facility the
//!   operator deploys idle capital into. Supply, withdraw, and a balance
//!   query; the facility's reported balance may exceed the net amount
//!   supplied once profit has been credited.
//!
//! Neither trait does any accounting of its own. These are pure
//! translation seams, and the single point where the core's correctness
//! depends on the collaborator honoring its contract. Everything else in
//! the crate is testable against the in-memory stand-ins in
//! [`crate::sim`].
//!
//! All methods take `&self`: implementations carry their own interior
//! locking so a single instance can be shared via `Arc` between the vault
//! and whatever harness is driving it.

use thiserror::Error;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by an asset ledger implementation.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The source account does not hold the requested amount.
    #[error("insufficient asset balance: {holder} holds {available}, transfer of {requested}")]
    InsufficientBalance {
        /// The account being debited.
        holder: Identity,
        /// Its current balance.
        available: u64,
        /// The transfer amount that was rejected.
        requested: u64,
    },

    /// The spender's allowance does not cover the requested pull.
    #[error("insufficient allowance: {spender} approved for {approved}, pull of {requested}")]
    InsufficientAllowance {
        /// The account attempting the pull.
        spender: Identity,
        /// The currently approved amount.
        approved: u64,
        /// The pull amount that was rejected.
        requested: u64,
    },
}

/// Failures surfaced by a yield facility implementation.
#[derive(Debug, Error)]
pub enum FacilityError {
    /// The facility cannot return the requested amount right now.
    #[error("facility liquidity unavailable: position {available}, recall of {requested}")]
    LiquidityUnavailable {
        /// The facility's current position for the caller.
        available: u64,
        /// The recall amount that was rejected.
        requested: u64,
    },

    /// An underlying asset transfer failed while settling with the
    /// facility.
    #[error("facility asset settlement failed: {0}")]
    Asset(#[from] AssetError),
}

// ---------------------------------------------------------------------------
// AssetLedger
// ---------------------------------------------------------------------------

/// The fungible base-asset ledger the vault settles against.
///
/// Standard conservation semantics: total supply is constant across
/// transfers, and a transfer fails rather than overdrawing the source.
pub trait AssetLedger {
    /// Moves `amount` from `from` to `to`.
    fn transfer(&self, from: &Identity, to: &Identity, amount: u64) -> Result<(), AssetError>;

    /// Moves `amount` from `from` to `to` on the authority of `spender`,
    /// consuming that much of the allowance `from` granted to `spender`.
    fn transfer_from(
        &self,
        spender: &Identity,
        from: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<(), AssetError>;

    /// Sets the allowance `owner` grants to `spender`. Overwrites any
    /// previous allowance, it does not accumulate.
    fn approve(&self, owner: &Identity, spender: &Identity, amount: u64);

    /// Current balance of `holder`. Unknown holders hold zero.
    fn balance_of(&self, holder: &Identity) -> u64;
}

// ---------------------------------------------------------------------------
// YieldFacility
// ---------------------------------------------------------------------------

/// The external yield-generating facility.
///
/// The vault's cached `deployed_assets` is a belief about this system's
/// state, refreshed by [`balance_of`](YieldFacility::balance_of) -- the
/// facility never pushes updates into the vault synchronously.
pub trait YieldFacility {
    /// Accepts `amount` of the base asset from `from` into the facility.
    fn supply(&self, from: &Identity, amount: u64) -> Result<(), FacilityError>;

    /// Returns `amount` of the base asset to `to`.
    ///
    /// # Errors
    ///
    /// [`FacilityError::LiquidityUnavailable`] when the facility cannot
    /// cover the requested amount from `to`'s position.
    fn withdraw(&self, to: &Identity, amount: u64) -> Result<(), FacilityError>;

    /// The facility's current belief about `holder`'s position, including
    /// any profit credited since the capital was supplied.
    fn balance_of(&self, holder: &Identity) -> u64;
}

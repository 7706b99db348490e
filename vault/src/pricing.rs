//! # Share Pricing
//!
//! The exchange-rate arithmetic between shares and assets, isolated here
//! so that it can be tested and benchmarked without a vault around it.
//!
//! ## Rounding Convention
//!
//! Floor division, in both directions. A deposit mints
//! `floor(amount * total_shares / total_assets)` shares; a redemption
//! pays `floor(share_amount * total_assets / total_shares)` assets.
//! Flooring both ways means the vault never owes more than it holds;
//! the fractional residue stays in the pool and accrues to the remaining
//! holders. That one-sided drift is deliberate and is not corrected.
//!
//! ## Bootstrap
//!
//! When no shares exist there is no price to quote. The first deposit
//! sets the 1:1 baseline: it mints exactly as many shares as assets
//! deposited.
//!
//! All intermediates are `u128`, so `u64 * u64` products cannot overflow.

use crate::config::PRICE_SCALE;

/// Shares to mint for a deposit of `amount` against the given totals.
///
/// Bootstrap case (`total_shares == 0`): returns `amount`, establishing
/// the 1:1 baseline. Otherwise new shares dilute exactly in proportion
/// to existing claims, so pre-existing holders' assets-per-share is
/// unchanged by the deposit.
pub fn shares_for_deposit(amount: u64, total_shares: u64, total_assets: u64) -> u64 {
    // Zero assets with shares outstanding is a degenerate state the
    // operations cannot produce; priced as a fresh bootstrap rather
    // than dividing by zero.
    if total_shares == 0 || total_assets == 0 {
        return amount;
    }
    mul_div_floor(amount, total_shares, total_assets)
}

/// Assets owed for redeeming `share_amount` against the given totals.
///
/// Must be called with the *pre-burn* totals: the price of a redemption
/// is set by the state immediately preceding it.
///
/// # Panics
///
/// Panics if `total_shares == 0` -- there is nothing to redeem against,
/// and the share ledger's burn check makes that state unreachable from
/// the public operations.
pub fn assets_for_shares(share_amount: u64, total_shares: u64, total_assets: u64) -> u64 {
    assert!(total_shares > 0, "redemption priced against empty ledger");
    mul_div_floor(share_amount, total_assets, total_shares)
}

/// Fixed-point price-per-share scaled by [`PRICE_SCALE`].
///
/// Returns `None` during bootstrap (`total_shares == 0`), when the price
/// is undefined.
pub fn price_per_share(total_shares: u64, total_assets: u64) -> Option<u128> {
    if total_shares == 0 {
        return None;
    }
    Some(total_assets as u128 * PRICE_SCALE / total_shares as u128)
}

/// `floor(a * b / c)` with a `u128` intermediate.
///
/// The quotient fits `u64` for every state the operations can produce;
/// a quotient outside `u64` would mean the books themselves are corrupt
/// and is treated as a fatal accounting defect.
fn mul_div_floor(a: u64, b: u64, c: u64) -> u64 {
    debug_assert!(c > 0);
    let wide = a as u128 * b as u128 / c as u128;
    u64::try_from(wide).expect("pricing quotient overflowed u64: fatal accounting defect")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! # Protocol Configuration & Constants
//!
//! Every magic number in HARBOR lives here. A constant hardcoded anywhere
//! else in the tree is a bug waiting for a reviewer.
//!
//! The vault's arithmetic is integer-only: amounts and shares are `u64` in
//! smallest-unit denomination, pricing uses `u128` intermediates, and the
//! published price-per-share is a fixed-point value scaled by
//! [`PRICE_SCALE`]. No floating point touches the books.

/// Fixed-point scale for the published price-per-share.
///
/// `price_per_share() == PRICE_SCALE` means one share redeems for exactly
/// one asset unit. Six decimal places of price resolution is ample for a
/// vault whose underlying amounts are already smallest-unit integers.
pub const PRICE_SCALE: u128 = 1_000_000;

/// Basis point denominator. 1 bp = 0.01%, so 10_000 bps = 100%.
///
/// Used by the simulation layer to express facility profit as a fraction
/// of deployed capital.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Domain separator for deriving participant identities.
///
/// Prefixed to every label before hashing so an [`Identity`] preimage can
/// never collide with a hash computed for any other purpose.
///
/// [`Identity`]: crate::identity::Identity
pub const IDENTITY_DOMAIN: &str = "harbor/identity/v1";

/// The crate version, re-exported for the CLI's `version` output.
pub const VAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

// Copyright (c) 2026 Harbor Labs. MIT License.
// See LICENSE for details.

//! # HARBOR: Pooled-Capital Yield Vault
//!
//! Depositors pool a fungible base asset and receive proportional
//! ownership shares; an operator redirects idle capital to an external
//! yield facility and recalls it; withdrawals redeem shares for a
//! proportional claim on everything the vault tracks, profit included.
//! The hard part is not moving tokens -- it is keeping the share
//! accounting exact while capital is partially deployed and profit
//! arrives from a collaborator the vault does not control.
//!
//! ## Architecture
//!
//! The crate is split along the seams where trust changes hands:
//!
//! - **ledger**: share bookkeeping. Owns total shares and the cap table;
//!   makes no external calls.
//! - **pricing**: the shares/assets exchange-rate arithmetic. Floor
//!   division both ways, `u128` intermediates, documented drift.
//! - **vault**: the accounting core and public entry points. Composes
//!   the ledger, the asset book, and the guard behind one mutation
//!   boundary.
//! - **facility**: the two capability traits the core trusts,
//!   [`AssetLedger`](facility::AssetLedger) and
//!   [`YieldFacility`](facility::YieldFacility).
//! - **guard**: operator authorization and the one-shot lifecycle.
//! - **identity**: content-addressed participant identifiers.
//! - **sim**: in-memory collaborator stand-ins for tests and demos.
//! - **config**: protocol constants.
//!
//! ## Design Philosophy
//!
//! 1. Integer arithmetic only; overflow is a fatal defect, not an error.
//! 2. Every precondition is checked before any mutation; external calls
//!    settle last. A failed operation leaves zero observable mutation.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod facility;
pub mod guard;
pub mod identity;
pub mod ledger;
pub mod pricing;
pub mod sim;
pub mod vault;

pub use facility::{AssetError, AssetLedger, FacilityError, YieldFacility};
pub use guard::{AccessGuard, GuardError, Phase};
pub use identity::Identity;
pub use ledger::{LedgerError, ShareLedger};
pub use vault::{DepositReceipt, Vault, VaultError, VaultSnapshot, WithdrawReceipt};

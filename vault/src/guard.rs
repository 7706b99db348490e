//! # Access Guard
//!
//! Gates which caller may invoke which operation, and owns the vault's
//! one-transition lifecycle.
//!
//! ## Authorization classes
//!
//! - **Self-service** (deposit, withdraw): permitted for any caller acting
//!   on their own share balance. There is no role check here on purpose --
//!   [`ShareLedger::burn`](crate::ledger::ShareLedger::burn) enforces this
//!   structurally, since a caller can never burn shares they do not hold.
//! - **Privileged** (supply to / withdraw from the facility): permitted
//!   only for the operator identity bound at initialization. Checked
//!   before any state is touched.
//!
//! ## Lifecycle
//!
//! ```text
//!   Uninitialized ──initialize──► Active
//! ```
//!
//! `initialize` binds the operator exactly once and is terminal. A second
//! call fails with `AlreadyInitialized`; operations invoked before the
//! first call fail with `NotInitialized`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by authorization and lifecycle checks.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A privileged operation was invoked by a non-operator identity.
    #[error("unauthorized: caller {caller} is not the operator")]
    Unauthorized {
        /// The identity that attempted the privileged call.
        caller: Identity,
    },

    /// `initialize` was called on an already-active vault.
    #[error("already initialized")]
    AlreadyInitialized,

    /// An operation was invoked before `initialize`.
    #[error("not initialized")]
    NotInitialized,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Vault lifecycle phase. There are exactly two, and the transition
/// between them happens once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created but not yet bound to collaborators. No operation is
    /// defined in this phase.
    Uninitialized,
    /// Fully bound and operating. Terminal.
    Active,
}

// ---------------------------------------------------------------------------
// AccessGuard
// ---------------------------------------------------------------------------

/// Lifecycle phase plus the operator binding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessGuard {
    phase: Phase,
    operator: Option<Identity>,
}

impl AccessGuard {
    /// Creates a guard in the `Uninitialized` phase with no operator.
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            operator: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The bound operator, if the guard has been initialized.
    pub fn operator(&self) -> Option<&Identity> {
        self.operator.as_ref()
    }

    /// Binds the operator and transitions to `Active`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::AlreadyInitialized`] on any call after the
    /// first. The existing binding is untouched.
    pub fn initialize(&mut self, operator: Identity) -> Result<(), GuardError> {
        if self.phase == Phase::Active {
            return Err(GuardError::AlreadyInitialized);
        }
        self.operator = Some(operator);
        self.phase = Phase::Active;
        Ok(())
    }

    /// Fails unless the vault is in the `Active` phase.
    pub fn require_active(&self) -> Result<(), GuardError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Uninitialized => Err(GuardError::NotInitialized),
        }
    }

    /// Fails unless the vault is active *and* `caller` is the operator.
    pub fn require_operator(&self, caller: &Identity) -> Result<(), GuardError> {
        self.require_active()?;
        match self.operator {
            Some(ref operator) if operator == caller => Ok(()),
            _ => Err(GuardError::Unauthorized { caller: *caller }),
        }
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

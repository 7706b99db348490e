//! # Participant Identity
//!
//! Every party the vault interacts with -- depositors, the operator, the
//! vault itself, the asset ledger's accounts, the yield facility -- is
//! named by an [`Identity`]: a 32-byte content-addressed identifier.
//!
//! Identities are deterministic BLAKE3 hashes of a human-readable label,
//! domain-separated so an identity can never collide with a hash computed
//! for any other purpose. The same label always produces the same identity
//! regardless of when or where it is derived -- no registry needed, no
//! coordination required. Tests and simulations lean on this heavily:
//! `Identity::derive("alice")` is stable across runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::IDENTITY_DOMAIN;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a vault participant.
///
/// Computed as `BLAKE3(IDENTITY_DOMAIN || 0x00 || label)`. The separator
/// byte prevents ambiguity between the domain tag and the label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity([u8; 32]);

impl Identity {
    /// Creates an `Identity` from raw 32-byte material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Derives an identity from a human-readable label.
    ///
    /// Deterministic: the same label yields the same identity on every
    /// machine, forever. Suitable for well-known participants ("operator",
    /// "treasury") and for reproducible test fixtures.
    pub fn derive(label: &str) -> Self {
        let mut preimage = Vec::with_capacity(IDENTITY_DOMAIN.len() + label.len() + 1);
        preimage.extend_from_slice(IDENTITY_DOMAIN.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(label.as_bytes());

        Self(*blake3::hash(&preimage).as_bytes())
    }

    /// Generates a fresh random identity.
    ///
    /// Used when a participant has no meaningful label -- e.g. an ephemeral
    /// depositor in a simulation run.
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Returns the hex-encoded identity.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded identity.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Serde helper for Identity-keyed maps
// ---------------------------------------------------------------------------

/// Serde adapter for `HashMap<Identity, V>` fields.
///
/// JSON object keys must be strings, so identity-keyed maps are serialized
/// with hex-encoded keys. Usage:
///
/// ```ignore
/// struct Holdings {
///     #[serde(with = "crate::identity::identity_map")]
///     balances: HashMap<Identity, u64>,
/// }
/// ```
pub mod identity_map {
    use super::Identity;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<Identity, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser_map = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            ser_map.serialize_entry(&key.to_hex(), value)?;
        }
        ser_map.end()
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<Identity, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(key, value)| {
                Identity::from_hex(&key)
                    .map(|id| (id, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

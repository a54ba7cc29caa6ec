//! Identifiers used throughout triescrow.
//!
//! Parties are identified by their 20-byte account address, exactly as the
//! wallet layer hands them over. The all-zero address is reserved as the
//! "no identity" sentinel for unset session slots.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EscrowError, Result};

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

// ---------------------------------------------------------------------------
// PartyId
// ---------------------------------------------------------------------------

/// An externally authenticated caller identity (account address).
///
/// Equality is byte-wise, so `0xAbC…` and `0xabc…` parse to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct PartyId(pub [u8; ADDRESS_LEN]);

impl PartyId {
    /// The "no identity" sentinel.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Whether this is the unset sentinel.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Abbreviated form for log lines, e.g. `0xf39f…2266`.
    #[must_use]
    pub fn short(&self) -> String {
        format!(
            "0x{}…{}",
            hex::encode(&self.0[..2]),
            hex::encode(&self.0[ADDRESS_LEN - 2..])
        )
    }

    /// A random identity for tests.
    #[cfg(any(test, feature = "test-helpers"))]
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<[u8; ADDRESS_LEN]>())
    }
}

impl Default for PartyId {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for PartyId {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(EscrowError::InvalidIdentity {
                input: s.to_string(),
                reason: format!("expected {} hex digits, got {}", ADDRESS_LEN * 2, digits.len()),
            });
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| {
            EscrowError::InvalidIdentity {
                input: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for PartyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PartyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// LogicalTime
// ---------------------------------------------------------------------------

/// Monotonic sequence number stamped on every emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct LogicalTime(pub u64);

impl LogicalTime {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

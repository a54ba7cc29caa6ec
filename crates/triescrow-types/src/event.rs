//! Session events for external observers (event log, UI).
//!
//! Every committed command produces one or more [`EventRecord`]s. Records
//! form an append-only trail ordered by [`LogicalTime`]; nothing in the
//! core ever reads them back to make a decision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LogicalTime, PartyId};

/// A state change observed by the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Seller and arbiter were assigned by the buyer.
    Configured { seller: PartyId, arbiter: PartyId },
    /// The buyer deposited `amount` into escrow.
    Funded { buyer: PartyId, amount: Decimal },
    /// Held funds were paid out to the seller.
    Released { seller: PartyId, amount: Decimal },
    /// Held funds were returned to the buyer. Carries the seller of the
    /// cycle for context.
    Refunded { seller: PartyId, amount: Decimal },
    /// The session was re-armed after a refund. `timestamp` is Unix seconds.
    SessionReset { buyer: PartyId, timestamp: i64 },
}

impl SessionEvent {
    /// Stable label for event feeds.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configured { .. } => "ESCROW_SET_UP",
            Self::Funded { .. } => "FUNDED",
            Self::Released { .. } => "RELEASED",
            Self::Refunded { .. } => "REFUNDED",
            Self::SessionReset { .. } => "RESET",
        }
    }

    /// The amount moved by this event, if any.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Funded { amount, .. }
            | Self::Released { amount, .. }
            | Self::Refunded { amount, .. } => Some(*amount),
            Self::Configured { .. } | Self::SessionReset { .. } => None,
        }
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured { seller, arbiter } => {
                write!(f, "{} seller={seller} arbiter={arbiter}", self.label())
            }
            Self::Funded { buyer, amount } => {
                write!(f, "{} buyer={buyer} amount={amount}", self.label())
            }
            Self::Released { seller, amount } | Self::Refunded { seller, amount } => {
                write!(f, "{} seller={seller} amount={amount}", self.label())
            }
            Self::SessionReset { buyer, timestamp } => {
                write!(f, "{} buyer={buyer} timestamp={timestamp}", self.label())
            }
        }
    }
}

/// A sequenced, timestamped event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Logical time; strictly increasing across the life of a machine.
    pub sequence: LogicalTime,
    /// Wall-clock time at which the record was produced.
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: SessionEvent,
}

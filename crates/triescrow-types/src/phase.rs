//! Custody phases of an escrow session.
//!
//! The session alternates between two phases and never terminates:
//! **AWAITING_PAYMENT → AWAITING_DELIVERY → AWAITING_PAYMENT → …**
//!
//! During AWAITING_PAYMENT, the buyer may (re)configure the parties and
//! deposit. During AWAITING_DELIVERY, funds are held until a release or
//! refund returns the session to AWAITING_PAYMENT.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two phases of the custody state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No funds held. Configuration and deposit are allowed.
    #[default]
    AwaitingPayment,
    /// A deposit is held. Only release or refund are allowed.
    AwaitingDelivery,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingPayment => write!(f, "AWAITING_PAYMENT"),
            Self::AwaitingDelivery => write!(f, "AWAITING_DELIVERY"),
        }
    }
}

impl Phase {
    /// Numeric code used by the on-chain enumeration (0, 1).
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::AwaitingPayment => 0,
            Self::AwaitingDelivery => 1,
        }
    }

    /// Decode a numeric phase code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AwaitingPayment),
            1 => Some(Self::AwaitingDelivery),
            _ => None,
        }
    }

    /// Whether funds are held in this phase.
    #[must_use]
    pub fn holds_funds(self) -> bool {
        self == Self::AwaitingDelivery
    }
}

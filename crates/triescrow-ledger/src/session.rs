//! The single escrow session.
//!
//! ## State Machine
//!
//! ```text
//!        configure (self-loop)
//!         ┌──────┐
//!         ▼      │
//!   ┌──────────────────┐   deposit(buyer)   ┌───────────────────┐
//!   │ AWAITING_PAYMENT ├───────────────────▶│ AWAITING_DELIVERY │
//!   └──────────────────┘                    └─────────┬─────────┘
//!            ▲     release(buyer|arbiter) / refund(seller|arbiter)
//!            └────────────────────────────────────────┘
//! ```
//!
//! The session is re-armed in place after every cycle and never
//! terminates. Only [`EscrowLedger`](crate::EscrowLedger) writes it; every
//! other component reads it through the accessors below.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use triescrow_types::{Parties, PartyId, Phase};

/// Phase, parties and the deposited amount of the active session.
///
/// Invariant: `deposited > 0` if and only if `phase == AwaitingDelivery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub(crate) phase: Phase,
    pub(crate) parties: Parties,
    pub(crate) deposited: Decimal,
}

impl Session {
    /// A fresh, unconfigured session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn parties(&self) -> Parties {
        self.parties
    }

    #[must_use]
    pub fn buyer(&self) -> PartyId {
        self.parties.buyer
    }

    #[must_use]
    pub fn seller(&self) -> PartyId {
        self.parties.seller
    }

    #[must_use]
    pub fn arbiter(&self) -> PartyId {
        self.parties.arbiter
    }

    /// Amount held for the current cycle (zero when nothing is held).
    #[must_use]
    pub fn deposited(&self) -> Decimal {
        self.deposited
    }

    /// Whether seller and arbiter have been set.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.parties.is_placed()
    }

    /// Whether the deposit/phase invariant holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (self.deposited > Decimal::ZERO) == self.phase.holds_funds()
    }
}

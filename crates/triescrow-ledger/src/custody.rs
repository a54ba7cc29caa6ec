//! Value-transfer boundary.
//!
//! The ledger never represents money itself beyond the deposited amount.
//! It asks a [`Custody`] to move value between a party's account and the
//! escrow account. Every call is atomic: either the full transfer happens
//! or no balance changes.

use std::collections::HashMap;

use rust_decimal::Decimal;
use triescrow_types::{EscrowError, PartyId, Result};

/// External custody mechanism that holds parties' funds and the escrow
/// account.
pub trait Custody {
    /// Funds the party can currently spend.
    fn available(&self, party: PartyId) -> Decimal;

    /// Funds currently held in escrow.
    fn held(&self) -> Decimal;

    /// Move `amount` from the party's account into escrow.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the party cannot cover `amount`.
    fn hold(&mut self, from: PartyId, amount: Decimal) -> Result<()>;

    /// Move `amount` out of escrow into the party's account.
    ///
    /// # Errors
    /// Returns `InsufficientEscrow` if escrow holds less than `amount`.
    fn pay_out(&mut self, to: PartyId, amount: Decimal) -> Result<()>;

    /// Credit value arriving from outside the escrow system.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount` is not positive or the credit
    /// cannot be represented.
    fn credit(&mut self, to: PartyId, amount: Decimal) -> Result<()>;

    /// Sum of every party's balance plus the escrow account.
    ///
    /// # Errors
    /// Returns `Internal` if the sum overflows.
    fn total_supply(&self) -> Result<Decimal>;
}

/// In-process custody with one balance per party and a single escrow
/// account.
///
/// Total supply never exceeds `Decimal::MAX`: `credit` refuses anything
/// that would push it past, so moves between accounts cannot overflow.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustody {
    balances: HashMap<PartyId, Decimal>,
    escrow: Decimal,
}

impl InMemoryCustody {
    /// Create an empty custody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style funding, for seeding balances.
    ///
    /// # Errors
    /// Same as [`Custody::credit`].
    pub fn with_balance(mut self, party: PartyId, amount: Decimal) -> Result<Self> {
        self.credit(party, amount)?;
        Ok(self)
    }

    /// Number of parties with an account.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}

fn overflow(what: &str, amount: Decimal) -> EscrowError {
    EscrowError::Internal(format!("{what} of {amount} overflows"))
}

impl Custody for InMemoryCustody {
    fn available(&self, party: PartyId) -> Decimal {
        self.balances.get(&party).copied().unwrap_or_default()
    }

    fn held(&self) -> Decimal {
        self.escrow
    }

    fn hold(&mut self, from: PartyId, amount: Decimal) -> Result<()> {
        let balance = self.available(from);
        if !self.balances.contains_key(&from) || balance < amount {
            return Err(EscrowError::InsufficientBalance {
                needed: amount,
                available: balance,
            });
        }

        let new_balance = balance
            .checked_sub(amount)
            .ok_or_else(|| overflow("hold", amount))?;
        let new_escrow = self
            .escrow
            .checked_add(amount)
            .ok_or_else(|| overflow("hold", amount))?;

        self.balances.insert(from, new_balance);
        self.escrow = new_escrow;
        Ok(())
    }

    fn pay_out(&mut self, to: PartyId, amount: Decimal) -> Result<()> {
        if self.escrow < amount {
            return Err(EscrowError::InsufficientEscrow {
                needed: amount,
                held: self.escrow,
            });
        }

        let new_escrow = self
            .escrow
            .checked_sub(amount)
            .ok_or_else(|| overflow("payout", amount))?;
        let new_balance = self
            .available(to)
            .checked_add(amount)
            .ok_or_else(|| overflow("payout", amount))?;

        self.escrow = new_escrow;
        self.balances.insert(to, new_balance);
        Ok(())
    }

    fn credit(&mut self, to: PartyId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount {
                reason: format!("credit must be positive, got {amount}"),
            });
        }
        let unrepresentable = || EscrowError::InvalidAmount {
            reason: format!("credit of {amount} exceeds the representable supply"),
        };
        self.total_supply()?
            .checked_add(amount)
            .ok_or_else(unrepresentable)?;
        let new_balance = self
            .available(to)
            .checked_add(amount)
            .ok_or_else(unrepresentable)?;

        self.balances.insert(to, new_balance);
        Ok(())
    }

    fn total_supply(&self) -> Result<Decimal> {
        self.balances
            .values()
            .try_fold(self.escrow, |acc, b| acc.checked_add(*b))
            .ok_or_else(|| EscrowError::Internal("total supply overflows".into()))
    }
}

//! Supply conservation invariant checker.
//!
//! Escrow only moves value between accounts, never creates or destroys it:
//! ```text
//! Σ(party balances) + held == Σ(credited from outside)
//! held == session.deposited
//! ```
//!
//! Checked after every committed command. A violation means custody and
//! ledger disagree and is reported as a critical error.

use rust_decimal::Decimal;
use triescrow_types::{EscrowError, Result};

/// Tracks value entering the system and validates conservation.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total credited from outside since the machine started.
    inflow: Decimal,
}

impl SupplyConservation {
    /// Start tracking from an existing supply (e.g., pre-funded custody).
    #[must_use]
    pub fn with_baseline(supply: Decimal) -> Self {
        Self { inflow: supply }
    }

    /// Record value arriving from outside.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] if the tracked
    /// inflow would overflow.
    pub fn record_inflow(&mut self, amount: Decimal) -> Result<()> {
        self.inflow = self.inflow.checked_add(amount).ok_or_else(|| {
            EscrowError::SupplyInvariantViolation {
                reason: format!("inflow {} + {amount} overflows", self.inflow),
            }
        })?;
        Ok(())
    }

    #[must_use]
    pub fn expected_supply(&self) -> Decimal {
        self.inflow
    }

    /// Verify total custody supply and the escrow/deposit match.
    ///
    /// # Errors
    /// Returns [`EscrowError::SupplyInvariantViolation`] on any mismatch.
    pub fn verify(&self, actual_supply: Decimal, held: Decimal, deposited: Decimal) -> Result<()> {
        if actual_supply != self.inflow {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual_supply} != expected {}",
                    self.inflow
                ),
            });
        }
        if held != deposited {
            return Err(EscrowError::SupplyInvariantViolation {
                reason: format!("escrow holds {held} but session records {deposited}"),
            });
        }
        Ok(())
    }
}

//! Configuration for an escrow machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EscrowError, Result, constants};

/// Tunables of a single escrow machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Label of the custody unit (e.g., "ETH").
    pub asset: String,
    /// Maximum number of decimal places a deposit may carry.
    pub amount_scale: u32,
    /// Smallest accepted deposit. Unset means one unit at `amount_scale`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_deposit: Option<Decimal>,
    /// Maximum number of event records retained by the sink.
    pub event_log_capacity: usize,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            asset: constants::DEFAULT_ASSET.to_string(),
            amount_scale: constants::DEFAULT_AMOUNT_SCALE,
            min_deposit: None,
            event_log_capacity: constants::DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}

impl EscrowConfig {
    /// Smallest accepted deposit, defaulting to one unit at `amount_scale`
    /// (1 wei at the default scale).
    #[must_use]
    pub fn min_deposit(&self) -> Decimal {
        self.min_deposit.unwrap_or_else(|| {
            Decimal::new(1, self.amount_scale.min(constants::MAX_AMOUNT_SCALE))
        })
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    /// Returns [`EscrowError::Configuration`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.asset.trim().is_empty() {
            return Err(EscrowError::Configuration("asset must not be empty".into()));
        }
        if self.amount_scale > constants::MAX_AMOUNT_SCALE {
            return Err(EscrowError::Configuration(format!(
                "amount_scale {} exceeds maximum {}",
                self.amount_scale,
                constants::MAX_AMOUNT_SCALE
            )));
        }
        let min_deposit = self.min_deposit();
        if min_deposit <= Decimal::ZERO {
            return Err(EscrowError::Configuration(
                "min_deposit must be positive".into(),
            ));
        }
        if min_deposit.normalize().scale() > self.amount_scale {
            return Err(EscrowError::Configuration(format!(
                "min_deposit {min_deposit} has more than {} decimal places",
                self.amount_scale
            )));
        }
        if self.event_log_capacity == 0 {
            return Err(EscrowError::Configuration(
                "event_log_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for bad values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

//! Error types for the triescrow custody engine.
//!
//! All errors use the `TE_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Configuration / identity errors
//! - 2xx: Phase errors
//! - 3xx: Authorization errors
//! - 4xx: Amount errors
//! - 5xx: Custody / invariant errors
//! - 9xx: General / internal errors
//!
//! Every rejection leaves the session untouched, so no error is fatal to the
//! machine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Action, PartyId, Phase};

/// Central error enum for all triescrow operations.
#[derive(Debug, Error)]
pub enum EscrowError {
    // =================================================================
    // Configuration Errors (1xx)
    // =================================================================
    /// Malformed or out-of-phase configure attempt, including self-dealing
    /// role assignments.
    #[error("TE_ERR_100: Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The session has never been configured (no seller/arbiter).
    #[error("TE_ERR_101: Escrow is not configured")]
    NotConfigured,

    /// An identity string could not be parsed.
    #[error("TE_ERR_102: Invalid identity {input:?}: {reason}")]
    InvalidIdentity { input: String, reason: String },

    // =================================================================
    // Phase Errors (2xx)
    // =================================================================
    /// The action is not legal in the current phase.
    #[error("TE_ERR_200: Wrong phase: expected {expected}, got {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// Only the configured buyer may deposit.
    #[error("TE_ERR_300: Caller is not the buyer")]
    NotBuyer,

    /// The caller lacks the role required for the action.
    #[error("TE_ERR_301: Unauthorized: {caller} may not {action}")]
    Unauthorized { action: Action, caller: PartyId },

    // =================================================================
    // Amount Errors (4xx)
    // =================================================================
    /// Non-positive, mis-scaled or unaffordable deposit amount.
    #[error("TE_ERR_400: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The custody mechanism cannot debit the party.
    #[error("TE_ERR_401: Insufficient available balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    // =================================================================
    // Custody / Invariant Errors (5xx)
    // =================================================================
    /// The escrow account holds less than the payout requested.
    #[error("TE_ERR_500: Insufficient escrow: need {needed}, held {held}")]
    InsufficientEscrow { needed: Decimal, held: Decimal },

    /// Supply conservation or session invariant violated. Critical alert.
    #[error("TE_ERR_501: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TE_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TE_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("TE_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("TE_ERR_903: I/O error: {0}")]
    Io(String),
}

/// Coarse failure category, for collaborators that map errors to UI text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidConfiguration,
    NotConfigured,
    WrongPhase,
    Unauthorized,
    InvalidAmount,
    Custody,
    Internal,
}

impl EscrowError {
    /// The coarse category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfiguration { .. } | Self::InvalidIdentity { .. } => {
                ErrorKind::InvalidConfiguration
            }
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::WrongPhase { .. } => ErrorKind::WrongPhase,
            Self::NotBuyer | Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidAmount { .. } | Self::InsufficientBalance { .. } => {
                ErrorKind::InvalidAmount
            }
            Self::InsufficientEscrow { .. } | Self::SupplyInvariantViolation { .. } => {
                ErrorKind::Custody
            }
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// The `TE_ERR_nnn` code of this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "TE_ERR_100",
            Self::NotConfigured => "TE_ERR_101",
            Self::InvalidIdentity { .. } => "TE_ERR_102",
            Self::WrongPhase { .. } => "TE_ERR_200",
            Self::NotBuyer => "TE_ERR_300",
            Self::Unauthorized { .. } => "TE_ERR_301",
            Self::InvalidAmount { .. } => "TE_ERR_400",
            Self::InsufficientBalance { .. } => "TE_ERR_401",
            Self::InsufficientEscrow { .. } => "TE_ERR_500",
            Self::SupplyInvariantViolation { .. } => "TE_ERR_501",
            Self::Internal(_) => "TE_ERR_900",
            Self::Serialization(_) => "TE_ERR_901",
            Self::Configuration(_) => "TE_ERR_902",
            Self::Io(_) => "TE_ERR_903",
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EscrowError>;

impl From<std::io::Error> for EscrowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_phase_display() {
        let err = EscrowError::WrongPhase {
            expected: Phase::AwaitingDelivery,
            actual: Phase::AwaitingPayment,
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("TE_ERR_200"), "Got: {msg}");
        assert!(msg.contains("AWAITING_DELIVERY"));
        assert!(msg.contains("AWAITING_PAYMENT"));
    }

    #[test]
    fn unauthorized_names_action_and_caller() {
        let caller = PartyId::from_bytes([0xab; 20]);
        let err = EscrowError::Unauthorized {
            action: Action::Refund,
            caller,
        };
        let msg = format!("{err}");
        assert!(msg.contains("refund"));
        assert!(msg.contains(&caller.to_string()));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn code_matches_display_prefix() {
        let errors = vec![
            EscrowError::InvalidConfiguration {
                reason: "seller equals arbiter".into(),
            },
            EscrowError::NotConfigured,
            EscrowError::NotBuyer,
            EscrowError::InvalidAmount {
                reason: "zero".into(),
            },
            EscrowError::InsufficientEscrow {
                needed: Decimal::ONE,
                held: Decimal::ZERO,
            },
            EscrowError::Internal("test".into()),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with(err.code()),
                "Error {msg} does not start with {}",
                err.code()
            );
        }
    }

    #[test]
    fn kinds_group_related_errors() {
        assert_eq!(EscrowError::NotBuyer.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            EscrowError::InsufficientBalance {
                needed: Decimal::TWO,
                available: Decimal::ONE,
            }
            .kind(),
            ErrorKind::InvalidAmount
        );
        assert_eq!(EscrowError::Io("disk".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn io_error_converts() {
        let err: EscrowError = std::io::Error::other("boom").into();
        assert!(matches!(err, EscrowError::Io(ref m) if m.contains("boom")));
    }
}

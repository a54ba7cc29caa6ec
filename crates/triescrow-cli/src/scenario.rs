//! Scenario files: a config, opening balances and an ordered list of
//! commands, replayed against a fresh in-memory machine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use triescrow_ledger::{Custody, InMemoryCustody};
use triescrow_machine::{EscrowStateMachine, SessionSnapshot};
use triescrow_types::{Action, ErrorKind, EscrowConfig, EscrowError, EventRecord, PartyId, Result};

/// A replayable escrow scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: EscrowConfig,
    /// Opening balances per party.
    #[serde(default)]
    pub balances: BTreeMap<PartyId, Decimal>,
    pub steps: Vec<Step>,
}

/// One command issued on behalf of `caller`.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub caller: PartyId,
    #[serde(flatten)]
    pub command: Command,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    Configure { seller: PartyId, arbiter: PartyId },
    Deposit { amount: Decimal },
    Release,
    Refund,
}

impl Command {
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Configure { .. } => Action::Configure,
            Self::Deposit { .. } => Action::Deposit,
            Self::Release => Action::Release,
            Self::Refund => Action::Refund,
        }
    }
}

/// Result line for one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub caller: PartyId,
    pub action: Action,
    #[serde(flatten)]
    pub result: StepResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepResult {
    Committed {
        events: Vec<EventRecord>,
    },
    Rejected {
        code: &'static str,
        kind: ErrorKind,
        reason: String,
    },
}

/// State after the last step.
#[derive(Debug, Clone, Serialize)]
pub struct FinalState {
    pub snapshot: SessionSnapshot,
    pub balances: BTreeMap<PartyId, Decimal>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub outcomes: Vec<StepOutcome>,
    #[serde(rename = "final")]
    pub final_state: FinalState,
}

impl Scenario {
    /// Parse a scenario document.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for a bad config,
    /// `InvalidAmount` for a non-positive opening balance.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.config.validate()?;
        let non_positive = scenario.balances.iter().find(|(_, a)| **a <= Decimal::ZERO);
        if let Some((party, amount)) = non_positive {
            return Err(EscrowError::InvalidAmount {
                reason: format!("opening balance of {party} must be positive, got {amount}"),
            });
        }
        Ok(scenario)
    }

    /// Run every step in order. Rejected steps are recorded and the replay
    /// continues, as an external caller would.
    ///
    /// # Errors
    /// Only if the opening balances or config cannot seed a machine.
    pub fn replay(&self) -> Result<Replay> {
        let custody = self
            .balances
            .iter()
            .try_fold(InMemoryCustody::new(), |c, (party, amount)| {
                c.with_balance(*party, *amount)
            })?;
        let mut machine = EscrowStateMachine::new(self.config.clone(), custody)?;

        let outcomes = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let result = match &step.command {
                    Command::Configure { seller, arbiter } => {
                        machine.configure(step.caller, *seller, *arbiter)
                    }
                    Command::Deposit { amount } => machine.deposit(step.caller, *amount),
                    Command::Release => machine.release(step.caller),
                    Command::Refund => machine.refund(step.caller),
                };
                StepOutcome {
                    step: i + 1,
                    caller: step.caller,
                    action: step.command.action(),
                    result: match result {
                        Ok(events) => StepResult::Committed { events },
                        Err(err) => StepResult::Rejected {
                            code: err.code(),
                            kind: err.kind(),
                            reason: err.to_string(),
                        },
                    },
                }
            })
            .collect();

        let parties = machine.current_parties();
        let mut known: Vec<PartyId> = self.balances.keys().copied().collect();
        known.extend([parties.buyer, parties.seller, parties.arbiter]);
        let balances = known
            .into_iter()
            .filter(|p| !p.is_zero())
            .map(|p| (p, machine.custody().available(p)))
            .collect();

        Ok(Replay {
            outcomes,
            final_state: FinalState {
                snapshot: machine.snapshot(),
                balances,
            },
        })
    }
}

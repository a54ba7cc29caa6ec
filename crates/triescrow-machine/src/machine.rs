//! Escrow state machine: the only entry point for external callers.
//!
//! Each command runs as one unit:
//! 1. Refuse value commands on an unconfigured session (`NotConfigured`)
//! 2. Ask the [`TransitionGuard`] whether the caller may act (`Unauthorized`)
//! 3. Mutate through the [`EscrowLedger`] (which checks its own preconditions)
//! 4. Verify session and supply invariants
//! 5. Emit the resulting events through the [`SessionEventSink`]
//!
//! A rejection at steps 1–3 leaves the session, custody and sink untouched.
//! A failed invariant check at step 4 emits nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use triescrow_ledger::{Custody, EscrowLedger, RoleRegistry, Session, TransitionGuard};
use triescrow_types::{
    Action, EscrowConfig, EscrowError, EventRecord, LogicalTime, Parties, PartyId, Phase, Result,
    RoleSet, SessionEvent,
};

use crate::{conservation::SupplyConservation, sink::SessionEventSink};

/// A consistent, point-in-time view of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub parties: Parties,
    pub deposited: Decimal,
    pub placed: bool,
    /// Funds the custody reports as held in escrow.
    pub held: Decimal,
    /// Sequence of the most recent event.
    pub last_sequence: LogicalTime,
}

/// Orchestrates guard, ledger, custody and event sink for one session.
pub struct EscrowStateMachine<C: Custody> {
    config: EscrowConfig,
    ledger: EscrowLedger,
    custody: C,
    sink: SessionEventSink,
    supply: SupplyConservation,
}

impl<C: Custody> EscrowStateMachine<C> {
    /// Create a machine over an (optionally pre-funded) custody.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation, or the
    /// custody's error if its total supply cannot be computed.
    pub fn new(config: EscrowConfig, custody: C) -> Result<Self> {
        config.validate()?;
        let supply = SupplyConservation::with_baseline(custody.total_supply()?);
        Ok(Self {
            ledger: EscrowLedger::new(&config),
            sink: SessionEventSink::new(config.event_log_capacity),
            supply,
            custody,
            config,
        })
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    /// Assign seller and arbiter; the caller becomes buyer.
    ///
    /// # Errors
    /// `InvalidConfiguration` for self-dealing, sentinel identities or an
    /// outstanding deposit.
    pub fn configure(
        &mut self,
        caller: PartyId,
        seller: PartyId,
        arbiter: PartyId,
    ) -> Result<Vec<EventRecord>> {
        self.execute(Action::Configure, caller, |m| {
            m.ledger.configure(caller, seller, arbiter)?;
            Ok(vec![SessionEvent::Configured { seller, arbiter }])
        })
    }

    /// Deposit `amount` from the buyer into escrow.
    ///
    /// # Errors
    /// `NotConfigured`, `Unauthorized`, `WrongPhase` or `InvalidAmount`.
    pub fn deposit(&mut self, caller: PartyId, amount: Decimal) -> Result<Vec<EventRecord>> {
        self.execute(Action::Deposit, caller, |m| {
            m.ledger.deposit_funds(&mut m.custody, caller, amount)?;
            Ok(vec![SessionEvent::Funded {
                buyer: caller,
                amount,
            }])
        })
    }

    /// Release held funds to the seller.
    ///
    /// # Errors
    /// `NotConfigured`, `Unauthorized` or `WrongPhase`.
    pub fn release(&mut self, caller: PartyId) -> Result<Vec<EventRecord>> {
        self.execute(Action::Release, caller, |m| {
            let payout = m.ledger.release_funds(&mut m.custody)?;
            Ok(vec![SessionEvent::Released {
                seller: payout.recipient,
                amount: payout.amount,
            }])
        })
    }

    /// Refund held funds to the buyer and announce the reset.
    ///
    /// # Errors
    /// `NotConfigured`, `Unauthorized` or `WrongPhase`.
    pub fn refund(&mut self, caller: PartyId) -> Result<Vec<EventRecord>> {
        self.execute(Action::Refund, caller, |m| {
            let payout = m.ledger.refund_funds(&mut m.custody)?;
            Ok(vec![
                SessionEvent::Refunded {
                    seller: m.ledger.session().seller(),
                    amount: payout.amount,
                },
                SessionEvent::SessionReset {
                    buyer: payout.recipient,
                    timestamp: Utc::now().timestamp(),
                },
            ])
        })
    }

    /// Credit value arriving from outside (e.g., a wallet top-up).
    ///
    /// # Errors
    /// `InvalidAmount` if `amount` is not positive or would overflow the
    /// custody's supply.
    pub fn fund(&mut self, party: PartyId, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount {
                reason: format!("funding must be positive, got {amount}"),
            });
        }
        self.custody.credit(party, amount)?;
        self.supply.record_inflow(amount)?;
        tracing::debug!(party = %party, %amount, "Account funded");
        Ok(())
    }

    fn execute<F>(&mut self, action: Action, caller: PartyId, op: F) -> Result<Vec<EventRecord>>
    where
        F: FnOnce(&mut Self) -> Result<Vec<SessionEvent>>,
    {
        let result = self.authorize(action, caller).and_then(|()| op(self));
        let events = match result {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(
                    %action,
                    caller = %caller,
                    code = err.code(),
                    error = %err,
                    "Escrow command rejected"
                );
                return Err(err);
            }
        };

        self.verify_invariants()?;
        Ok(events.into_iter().map(|e| self.sink.emit(e)).collect())
    }

    fn authorize(&self, action: Action, caller: PartyId) -> Result<()> {
        let session = self.ledger.session();
        if action != Action::Configure && !session.is_placed() {
            return Err(EscrowError::NotConfigured);
        }
        TransitionGuard::check(action, caller, session)
    }

    fn verify_invariants(&self) -> Result<()> {
        let session = self.ledger.session();
        if !session.is_consistent() {
            let reason = format!(
                "deposited {} inconsistent with phase {}",
                session.deposited(),
                session.phase()
            );
            tracing::error!(%reason, "Session invariant violated");
            return Err(EscrowError::SupplyInvariantViolation { reason });
        }
        self.supply
            .verify(
                self.custody.total_supply()?,
                self.custody.held(),
                session.deposited(),
            )
            .inspect_err(|err| tracing::error!(error = %err, "Supply invariant violated"))
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.ledger.session().phase()
    }

    #[must_use]
    pub fn current_parties(&self) -> Parties {
        self.ledger.session().parties()
    }

    #[must_use]
    pub fn current_deposit(&self) -> Decimal {
        self.ledger.session().deposited()
    }

    /// Whether seller and arbiter are configured.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.ledger.session().is_placed()
    }

    #[must_use]
    pub fn roles_of(&self, identity: PartyId) -> RoleSet {
        RoleRegistry::role_of(identity, self.ledger.session())
    }

    /// Whether `caller` would currently pass the guard for `action`.
    #[must_use]
    pub fn may(&self, action: Action, caller: PartyId) -> bool {
        self.authorize(action, caller).is_ok()
    }

    /// A party's spendable balance in custody.
    #[must_use]
    pub fn balance_of(&self, party: PartyId) -> Decimal {
        self.custody.available(party)
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.ledger.session()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.ledger.session();
        SessionSnapshot {
            phase: session.phase(),
            parties: session.parties(),
            deposited: session.deposited(),
            placed: session.is_placed(),
            held: self.custody.held(),
            last_sequence: self.sink.last_sequence(),
        }
    }

    #[must_use]
    pub fn events(&self) -> &SessionEventSink {
        &self.sink
    }

    /// Hand retained events to an external consumer.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.sink.drain()
    }

    #[must_use]
    pub fn custody(&self) -> &C {
        &self.custody
    }

    #[must_use]
    pub fn config(&self) -> &EscrowConfig {
        &self.config
    }
}

//! Escrow ledger: the sole writer of session state.
//!
//! Every mutating operation validates all of its preconditions before it
//! touches anything, then performs the (atomic) custody transfer, then
//! updates the session. A failure at any step leaves both the session and
//! the custody balances unchanged.
//!
//! Authorization is NOT checked here beyond the buyer precondition of
//! `deposit_funds`; callers consult [`TransitionGuard`](crate::TransitionGuard)
//! first.

use rust_decimal::Decimal;
use triescrow_types::{EscrowConfig, EscrowError, Parties, PartyId, Phase, Result};

use crate::{Custody, Session};

/// Funds paid out of escrow when a cycle closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub recipient: PartyId,
    pub amount: Decimal,
}

/// Owns the [`Session`] and enforces every balance change.
#[derive(Debug, Clone)]
pub struct EscrowLedger {
    session: Session,
    /// Maximum decimal places of a deposit.
    amount_scale: u32,
    /// Smallest accepted deposit.
    min_deposit: Decimal,
}

impl EscrowLedger {
    /// Create a ledger with a fresh, unconfigured session.
    #[must_use]
    pub fn new(config: &EscrowConfig) -> Self {
        Self {
            session: Session::new(),
            amount_scale: config.amount_scale,
            min_deposit: config.min_deposit(),
        }
    }

    /// Read-only view of the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Assign the parties of the next cycle. The caller becomes buyer.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if a deposit is outstanding, if any
    /// identity is the sentinel, or if any two of caller/seller/arbiter
    /// coincide.
    pub fn configure(&mut self, caller: PartyId, seller: PartyId, arbiter: PartyId) -> Result<()> {
        let reject =
            |reason: String| -> Result<()> { Err(EscrowError::InvalidConfiguration { reason }) };

        if self.session.phase != Phase::AwaitingPayment || !self.session.deposited.is_zero() {
            return reject(format!(
                "cannot configure while {} with {} held",
                self.session.phase, self.session.deposited
            ));
        }
        if caller.is_zero() || seller.is_zero() || arbiter.is_zero() {
            return reject("buyer, seller and arbiter must all be set".into());
        }
        if seller == arbiter {
            return reject("seller and arbiter must differ".into());
        }
        if seller == caller {
            return reject("buyer cannot be the seller".into());
        }
        if arbiter == caller {
            return reject("buyer cannot be the arbiter".into());
        }

        self.session.parties = Parties {
            buyer: caller,
            seller,
            arbiter,
        };
        tracing::info!(
            buyer = %caller,
            seller = %seller,
            arbiter = %arbiter,
            "Escrow configured"
        );
        Ok(())
    }

    /// Move `amount` from the buyer into escrow and await delivery.
    ///
    /// # Errors
    /// - `NotConfigured` if the session has never been placed
    /// - `NotBuyer` if `caller` is not the buyer
    /// - `WrongPhase` if funds are already held
    /// - `InvalidAmount` if the amount is non-positive, too fine-grained,
    ///   below the minimum, or exceeds the buyer's available balance
    pub fn deposit_funds<C: Custody>(
        &mut self,
        custody: &mut C,
        caller: PartyId,
        amount: Decimal,
    ) -> Result<()> {
        if !self.session.is_placed() {
            return Err(EscrowError::NotConfigured);
        }
        if caller != self.session.buyer() {
            return Err(EscrowError::NotBuyer);
        }
        self.expect_phase(Phase::AwaitingPayment)?;
        self.validate_amount(amount)?;

        let available = custody.available(caller);
        if amount > available {
            return Err(EscrowError::InvalidAmount {
                reason: format!("deposit of {amount} exceeds available balance {available}"),
            });
        }

        // Custody transfer is atomic; on failure nothing has changed yet.
        custody.hold(caller, amount)?;

        self.session.deposited = amount;
        self.session.phase = Phase::AwaitingDelivery;
        tracing::info!(buyer = %caller, %amount, "Funds deposited into escrow");
        Ok(())
    }

    /// Pay the held amount to the seller and re-arm the session.
    ///
    /// # Errors
    /// Returns `WrongPhase` if nothing is held.
    pub fn release_funds<C: Custody>(&mut self, custody: &mut C) -> Result<Payout> {
        let seller = self.session.seller();
        self.close_cycle(custody, seller)
    }

    /// Return the held amount to the buyer and re-arm the session.
    ///
    /// # Errors
    /// Returns `WrongPhase` if nothing is held.
    pub fn refund_funds<C: Custody>(&mut self, custody: &mut C) -> Result<Payout> {
        let buyer = self.session.buyer();
        self.close_cycle(custody, buyer)
    }

    fn close_cycle<C: Custody>(&mut self, custody: &mut C, recipient: PartyId) -> Result<Payout> {
        self.expect_phase(Phase::AwaitingDelivery)?;
        let amount = self.session.deposited;

        custody.pay_out(recipient, amount)?;

        // Parties stay as configured, ready for the next deposit.
        self.session.deposited = Decimal::ZERO;
        self.session.phase = Phase::AwaitingPayment;
        tracing::info!(recipient = %recipient, %amount, "Escrow paid out, session re-armed");
        Ok(Payout { recipient, amount })
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.session.phase == expected {
            Ok(())
        } else {
            Err(EscrowError::WrongPhase {
                expected,
                actual: self.session.phase,
            })
        }
    }

    fn validate_amount(&self, amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(EscrowError::InvalidAmount {
                reason: format!("deposit must be positive, got {amount}"),
            });
        }
        if amount.normalize().scale() > self.amount_scale {
            return Err(EscrowError::InvalidAmount {
                reason: format!(
                    "deposit {amount} has more than {} decimal places",
                    self.amount_scale
                ),
            });
        }
        if amount < self.min_deposit {
            return Err(EscrowError::InvalidAmount {
                reason: format!("deposit {amount} is below minimum {}", self.min_deposit),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryCustody;

    fn dec(n: i64, scale: u32) -> Decimal {
        Decimal::new(n, scale)
    }

    struct Fixture {
        ledger: EscrowLedger,
        custody: InMemoryCustody,
        buyer: PartyId,
        seller: PartyId,
        arbiter: PartyId,
    }

    fn setup() -> Fixture {
        let (buyer, seller, arbiter) = (PartyId::random(), PartyId::random(), PartyId::random());
        let mut ledger = EscrowLedger::new(&EscrowConfig::default());
        ledger.configure(buyer, seller, arbiter).unwrap();
        Fixture {
            ledger,
            custody: InMemoryCustody::new().with_balance(buyer, dec(10, 0)).unwrap(),
            buyer,
            seller,
            arbiter,
        }
    }

    #[test]
    fn configure_sets_all_parties() {
        let f = setup();
        let s = f.ledger.session();
        assert_eq!(s.buyer(), f.buyer);
        assert_eq!(s.seller(), f.seller);
        assert_eq!(s.arbiter(), f.arbiter);
        assert!(s.is_placed());
        assert_eq!(s.phase(), Phase::AwaitingPayment);
    }

    #[test]
    fn configure_rejects_self_dealing() {
        let mut ledger = EscrowLedger::new(&EscrowConfig::default());
        let (b, s, r) = (PartyId::random(), PartyId::random(), PartyId::random());

        for (seller, arbiter) in [(s, s), (b, r), (s, b)] {
            let err = ledger.configure(b, seller, arbiter).unwrap_err();
            assert!(matches!(err, EscrowError::InvalidConfiguration { .. }));
        }
        assert!(!ledger.session().is_placed());
    }

    #[test]
    fn configure_rejects_sentinel() {
        let mut ledger = EscrowLedger::new(&EscrowConfig::default());
        let (b, s) = (PartyId::random(), PartyId::random());
        assert!(ledger.configure(b, s, PartyId::ZERO).is_err());
        assert!(ledger.configure(PartyId::ZERO, s, b).is_err());
    }

    #[test]
    fn configure_rejected_while_deposit_outstanding() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, dec(1, 0))
            .unwrap();
        let before = *f.ledger.session();
        let err = f
            .ledger
            .configure(f.buyer, PartyId::random(), f.arbiter)
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidConfiguration { .. }));
        assert_eq!(*f.ledger.session(), before);
    }

    #[test]
    fn deposit_holds_funds() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, dec(2, 0))
            .unwrap();
        assert_eq!(f.ledger.session().phase(), Phase::AwaitingDelivery);
        assert_eq!(f.ledger.session().deposited(), dec(2, 0));
        assert_eq!(f.custody.available(f.buyer), dec(8, 0));
        assert_eq!(f.custody.held(), dec(2, 0));
        assert!(f.ledger.session().is_consistent());
    }

    #[test]
    fn deposit_before_configuration_fails() {
        let mut ledger = EscrowLedger::new(&EscrowConfig::default());
        let mut custody = InMemoryCustody::new();
        let err = ledger
            .deposit_funds(&mut custody, PartyId::random(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotConfigured));
    }

    #[test]
    fn deposit_by_non_buyer_fails() {
        let mut f = setup();
        let err = f
            .ledger
            .deposit_funds(&mut f.custody, f.seller, Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, EscrowError::NotBuyer));
        assert!(f.ledger.session().deposited().is_zero());
    }

    #[test]
    fn second_deposit_is_wrong_phase() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, Decimal::ONE)
            .unwrap();
        let err = f
            .ledger
            .deposit_funds(&mut f.custody, f.buyer, Decimal::ONE)
            .unwrap_err();
        assert!(matches!(
            err,
            EscrowError::WrongPhase {
                expected: Phase::AwaitingPayment,
                actual: Phase::AwaitingDelivery
            }
        ));
        assert_eq!(f.custody.held(), Decimal::ONE);
    }

    #[test]
    fn invalid_amounts_rejected() {
        let mut f = setup();
        for amount in [
            Decimal::ZERO,
            dec(-1, 0),
            dec(1, 19),  // finer than wei
            dec(11, 0),  // more than available
        ] {
            let err = f
                .ledger
                .deposit_funds(&mut f.custody, f.buyer, amount)
                .unwrap_err();
            assert!(
                matches!(err, EscrowError::InvalidAmount { .. }),
                "amount {amount}: {err:?}"
            );
        }
        assert_eq!(f.custody.available(f.buyer), dec(10, 0));
        assert_eq!(f.ledger.session().phase(), Phase::AwaitingPayment);
    }

    #[test]
    fn trailing_zeros_do_not_count_against_scale() {
        let config = EscrowConfig {
            amount_scale: 2,
            min_deposit: Some(dec(1, 2)),
            ..EscrowConfig::default()
        };
        let (b, s, r) = (PartyId::random(), PartyId::random(), PartyId::random());
        let mut ledger = EscrowLedger::new(&config);
        ledger.configure(b, s, r).unwrap();
        let mut custody = InMemoryCustody::new().with_balance(b, dec(5, 0)).unwrap();
        ledger
            .deposit_funds(&mut custody, b, dec(1_500, 3)) // 1.500
            .unwrap();
        assert_eq!(ledger.session().deposited(), dec(15, 1));
    }

    #[test]
    fn below_minimum_rejected() {
        let config = EscrowConfig {
            min_deposit: Some(dec(1, 2)),
            ..EscrowConfig::default()
        };
        let (b, s, r) = (PartyId::random(), PartyId::random(), PartyId::random());
        let mut ledger = EscrowLedger::new(&config);
        ledger.configure(b, s, r).unwrap();
        let mut custody = InMemoryCustody::new().with_balance(b, dec(5, 0)).unwrap();
        let err = ledger
            .deposit_funds(&mut custody, b, dec(1, 3))
            .unwrap_err();
        assert!(matches!(err, EscrowError::InvalidAmount { .. }));
    }

    #[test]
    fn release_pays_seller_and_resets() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, dec(2, 0))
            .unwrap();
        let payout = f.ledger.release_funds(&mut f.custody).unwrap();
        assert_eq!(
            payout,
            Payout {
                recipient: f.seller,
                amount: dec(2, 0)
            }
        );
        let s = f.ledger.session();
        assert_eq!(s.phase(), Phase::AwaitingPayment);
        assert!(s.deposited().is_zero());
        assert_eq!(s.buyer(), f.buyer);
        assert_eq!(s.seller(), f.seller);
        assert_eq!(s.arbiter(), f.arbiter);
        assert_eq!(f.custody.available(f.seller), dec(2, 0));
        assert!(f.custody.held().is_zero());
    }

    #[test]
    fn refund_returns_to_buyer() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, dec(15, 1))
            .unwrap();
        let payout = f.ledger.refund_funds(&mut f.custody).unwrap();
        assert_eq!(payout.recipient, f.buyer);
        assert_eq!(payout.amount, dec(15, 1));
        assert_eq!(f.custody.available(f.buyer), dec(10, 0));
        assert!(f.ledger.session().is_consistent());
    }

    #[test]
    fn release_and_refund_need_held_funds() {
        let mut f = setup();
        for result in [
            f.ledger.release_funds(&mut f.custody),
            f.ledger.refund_funds(&mut f.custody),
        ] {
            assert!(matches!(
                result,
                Err(EscrowError::WrongPhase {
                    expected: Phase::AwaitingDelivery,
                    actual: Phase::AwaitingPayment
                })
            ));
        }
    }

    #[test]
    fn failed_payout_leaves_session_untouched() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, dec(3, 0))
            .unwrap();
        let before = *f.ledger.session();

        // A custody that lost track of the escrow cannot pay out.
        let mut empty = InMemoryCustody::new();
        let err = f.ledger.release_funds(&mut empty).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientEscrow { .. }));
        assert_eq!(*f.ledger.session(), before);
    }

    #[test]
    fn reconfigure_between_cycles() {
        let mut f = setup();
        f.ledger
            .deposit_funds(&mut f.custody, f.buyer, Decimal::ONE)
            .unwrap();
        f.ledger.release_funds(&mut f.custody).unwrap();

        let new_seller = PartyId::random();
        f.ledger
            .configure(f.buyer, new_seller, f.arbiter)
            .unwrap();
        assert_eq!(f.ledger.session().seller(), new_seller);
    }
}

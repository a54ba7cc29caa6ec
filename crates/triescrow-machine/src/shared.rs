//! Serialized, shareable access to one escrow machine.
//!
//! All four commands take a single exclusive write lock, so no two
//! commands ever interleave. Queries share a read lock and observe a whole
//! snapshot: phase and deposited amount are never read from different
//! states.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use triescrow_ledger::Custody;
use triescrow_types::{EscrowError, EventRecord, LogicalTime, Parties, PartyId, Phase, Result};

use crate::machine::{EscrowStateMachine, SessionSnapshot};

/// Cloneable handle to a machine guarded by one `RwLock`.
pub struct SharedEscrow<C: Custody> {
    inner: Arc<RwLock<EscrowStateMachine<C>>>,
}

impl<C: Custody> Clone for SharedEscrow<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Custody> SharedEscrow<C> {
    #[must_use]
    pub fn new(machine: EscrowStateMachine<C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(machine)),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EscrowStateMachine<C>>> {
        self.inner
            .write()
            .map_err(|_| EscrowError::Internal("escrow lock poisoned".into()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EscrowStateMachine<C>>> {
        self.inner
            .read()
            .map_err(|_| EscrowError::Internal("escrow lock poisoned".into()))
    }

    pub fn configure(
        &self,
        caller: PartyId,
        seller: PartyId,
        arbiter: PartyId,
    ) -> Result<Vec<EventRecord>> {
        self.write()?.configure(caller, seller, arbiter)
    }

    pub fn deposit(&self, caller: PartyId, amount: Decimal) -> Result<Vec<EventRecord>> {
        self.write()?.deposit(caller, amount)
    }

    pub fn release(&self, caller: PartyId) -> Result<Vec<EventRecord>> {
        self.write()?.release(caller)
    }

    pub fn refund(&self, caller: PartyId) -> Result<Vec<EventRecord>> {
        self.write()?.refund(caller)
    }

    pub fn fund(&self, party: PartyId, amount: Decimal) -> Result<()> {
        self.write()?.fund(party, amount)
    }

    pub fn current_phase(&self) -> Result<Phase> {
        Ok(self.read()?.current_phase())
    }

    pub fn current_parties(&self) -> Result<Parties> {
        Ok(self.read()?.current_parties())
    }

    pub fn current_deposit(&self) -> Result<Decimal> {
        Ok(self.read()?.current_deposit())
    }

    pub fn balance_of(&self, party: PartyId) -> Result<Decimal> {
        Ok(self.read()?.balance_of(party))
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.read()?.snapshot())
    }

    /// Retained events after `after`, for polling observers.
    pub fn events_since(&self, after: LogicalTime) -> Result<Vec<EventRecord>> {
        Ok(self.read()?.events().since(after))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use triescrow_ledger::InMemoryCustody;
    use triescrow_types::EscrowConfig;

    use super::*;

    fn shared(buyer: PartyId, seller: PartyId, arbiter: PartyId) -> SharedEscrow<InMemoryCustody> {
        let custody = InMemoryCustody::new()
            .with_balance(buyer, Decimal::new(100, 0))
            .unwrap();
        let machine = EscrowStateMachine::new(EscrowConfig::default(), custody).unwrap();
        let escrow = SharedEscrow::new(machine);
        escrow.configure(buyer, seller, arbiter).unwrap();
        escrow
    }

    #[test]
    fn concurrent_deposits_admit_exactly_one() {
        let (buyer, seller, arbiter) = (PartyId::random(), PartyId::random(), PartyId::random());
        let escrow = shared(buyer, seller, arbiter);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let escrow = escrow.clone();
                thread::spawn(move || escrow.deposit(buyer, Decimal::ONE).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        let snap = escrow.snapshot().unwrap();
        assert_eq!(snap.deposited, Decimal::ONE);
        assert_eq!(snap.held, Decimal::ONE);
        assert_eq!(escrow.balance_of(buyer).unwrap(), Decimal::new(99, 0));
    }

    #[test]
    fn concurrent_release_and_refund_pay_once() {
        let (buyer, seller, arbiter) = (PartyId::random(), PartyId::random(), PartyId::random());
        let escrow = shared(buyer, seller, arbiter);
        escrow.deposit(buyer, Decimal::new(5, 0)).unwrap();

        let releaser = {
            let escrow = escrow.clone();
            thread::spawn(move || escrow.release(arbiter).is_ok())
        };
        let refunder = {
            let escrow = escrow.clone();
            thread::spawn(move || escrow.refund(seller).is_ok())
        };
        let released = releaser.join().unwrap();
        let refunded = refunder.join().unwrap();

        assert!(released ^ refunded, "exactly one payout must win");
        let total = escrow.balance_of(buyer).unwrap() + escrow.balance_of(seller).unwrap();
        assert_eq!(total, Decimal::new(100, 0));
        assert_eq!(escrow.current_phase().unwrap(), Phase::AwaitingPayment);
        assert!(escrow.current_deposit().unwrap().is_zero());
    }

    #[test]
    fn readers_see_whole_snapshots() {
        let (buyer, seller, arbiter) = (PartyId::random(), PartyId::random(), PartyId::random());
        let escrow = shared(buyer, seller, arbiter);

        let writer = {
            let escrow = escrow.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    escrow.deposit(buyer, Decimal::ONE).unwrap();
                    escrow.release(buyer).unwrap();
                }
            })
        };
        for _ in 0..200 {
            let snap = escrow.snapshot().unwrap();
            assert_eq!(snap.deposited > Decimal::ZERO, snap.phase == Phase::AwaitingDelivery);
            assert_eq!(snap.held, snap.deposited);
        }
        writer.join().unwrap();

        assert_eq!(escrow.balance_of(seller).unwrap(), Decimal::new(50, 0));
        assert_eq!(escrow.current_parties().unwrap().arbiter, arbiter);
        let events = escrow.events_since(LogicalTime(0)).unwrap();
        assert_eq!(events.len(), 101);
    }
}

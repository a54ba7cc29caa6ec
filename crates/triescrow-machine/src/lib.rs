//! # triescrow-machine
//!
//! **Command plane**: the escrow state machine that external callers drive.
//!
//! ## Architecture
//!
//! The machine receives an already-authenticated caller identity and:
//! 1. Refuses value commands on an unconfigured session
//! 2. Authorizes the caller through the `TransitionGuard`
//! 3. Mutates the session through the `EscrowLedger` and its `Custody`
//! 4. Emits sequenced events into the [`SessionEventSink`]
//! 5. Checks the session and supply conservation invariants
//!
//! [`SharedEscrow`] serializes every command behind one write lock for
//! multi-threaded callers.

pub mod conservation;
pub mod machine;
pub mod shared;
pub mod sink;

pub use conservation::SupplyConservation;
pub use machine::{EscrowStateMachine, SessionSnapshot};
pub use shared::SharedEscrow;
pub use sink::SessionEventSink;

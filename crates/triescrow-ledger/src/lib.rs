//! # triescrow-ledger
//!
//! **Custody plane**: the escrow session, who holds which role, who may do
//! what, and every balance change.
//!
//! ## Architecture
//!
//! 1. **Session**: phase, parties and deposited amount of the one session
//! 2. **RoleRegistry**: resolves a caller identity to buyer/seller/arbiter
//! 3. **TransitionGuard**: pure allow/deny policy per (caller, action)
//! 4. **EscrowLedger**: sole writer of the session; enforces preconditions
//! 5. **Custody**: external value-transfer boundary (`InMemoryCustody`
//!    for tests and local runs)
//!
//! ## Command Flow
//!
//! ```text
//! caller → RoleRegistry.role_of() → TransitionGuard.check()
//!        → EscrowLedger.{configure, deposit_funds, release_funds, refund_funds}
//!        → Custody.{hold, pay_out}
//! ```

pub mod custody;
pub mod guard;
pub mod ledger;
pub mod roles;
pub mod session;

pub use custody::{Custody, InMemoryCustody};
pub use guard::TransitionGuard;
pub use ledger::{EscrowLedger, Payout};
pub use roles::RoleRegistry;
pub use session::Session;

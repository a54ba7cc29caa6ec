//! Transition guard: the authorization policy.
//!
//! Decides allow/deny for (caller, action) against a session snapshot,
//! independently of the ledger's own preconditions:
//!
//! | Action    | Allowed callers      |
//! |-----------|----------------------|
//! | configure | anyone               |
//! | deposit   | buyer                |
//! | release   | buyer or arbiter     |
//! | refund    | seller or arbiter    |
//!
//! Neither interested party can move funds in its own favour alone: the
//! buyer cannot refund to itself, the seller cannot release to itself. The
//! arbiter may do either.

use triescrow_types::{Action, EscrowError, PartyId, Result};

use crate::{RoleRegistry, Session};

/// Pure authorization policy for the four commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionGuard;

impl TransitionGuard {
    /// Anyone may attempt configuration; the ledger rejects malformed ones.
    #[must_use]
    pub fn can_configure(_caller: PartyId) -> bool {
        true
    }

    #[must_use]
    pub fn can_deposit(caller: PartyId, session: &Session) -> bool {
        RoleRegistry::role_of(caller, session).buyer
    }

    #[must_use]
    pub fn can_release(caller: PartyId, session: &Session) -> bool {
        let roles = RoleRegistry::role_of(caller, session);
        roles.buyer || roles.arbiter
    }

    #[must_use]
    pub fn can_refund(caller: PartyId, session: &Session) -> bool {
        let roles = RoleRegistry::role_of(caller, session);
        roles.seller || roles.arbiter
    }

    /// Decision for any action.
    #[must_use]
    pub fn allows(action: Action, caller: PartyId, session: &Session) -> bool {
        match action {
            Action::Configure => Self::can_configure(caller),
            Action::Deposit => Self::can_deposit(caller, session),
            Action::Release => Self::can_release(caller, session),
            Action::Refund => Self::can_refund(caller, session),
        }
    }

    /// Guard an action. Returns `Ok(())` if allowed.
    ///
    /// # Errors
    /// Returns [`EscrowError::Unauthorized`] if the caller lacks the role.
    pub fn check(action: Action, caller: PartyId, session: &Session) -> Result<()> {
        let allowed = Self::allows(action, caller, session);
        tracing::debug!(%action, caller = %caller.short(), allowed, "Guard decision");
        if allowed {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized { action, caller })
        }
    }
}

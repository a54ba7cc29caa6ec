//! Role resolution for the current session snapshot.

use triescrow_types::{PartyId, RoleSet};

use crate::Session;

/// Maps a caller identity to the roles it holds in a session.
///
/// Pure and infallible: an identity holding no role yields
/// [`RoleSet::NONE`]. The sentinel identity never holds a role, even in an
/// unconfigured session whose slots are all unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleRegistry;

impl RoleRegistry {
    #[must_use]
    pub fn role_of(identity: PartyId, session: &Session) -> RoleSet {
        if identity.is_zero() {
            return RoleSet::NONE;
        }
        RoleSet {
            buyer: identity == session.buyer(),
            seller: identity == session.seller(),
            arbiter: identity == session.arbiter(),
        }
    }
}

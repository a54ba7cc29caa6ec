//! Roles, party assignments and the actions they gate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PartyId;

/// One of the three privileged roles in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Arbiter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
            Self::Arbiter => write!(f, "arbiter"),
        }
    }
}

/// The set of roles an identity holds. An empty set is a valid result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoleSet {
    pub buyer: bool,
    pub seller: bool,
    pub arbiter: bool,
}

impl RoleSet {
    /// No privileged role.
    pub const NONE: Self = Self {
        buyer: false,
        seller: false,
        arbiter: false,
    };

    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Buyer => self.buyer,
            Role::Seller => self.seller,
            Role::Arbiter => self.arbiter,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.buyer || self.seller || self.arbiter)
    }

    /// The held roles in buyer, seller, arbiter order.
    #[must_use]
    pub fn roles(&self) -> Vec<Role> {
        [Role::Buyer, Role::Seller, Role::Arbiter]
            .into_iter()
            .filter(|r| self.contains(*r))
            .collect()
    }
}

/// The party assignment of the current cycle.
///
/// Unset slots hold [`PartyId::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Parties {
    pub buyer: PartyId,
    pub seller: PartyId,
    pub arbiter: PartyId,
}

impl Parties {
    /// All slots unset.
    pub const UNSET: Self = Self {
        buyer: PartyId::ZERO,
        seller: PartyId::ZERO,
        arbiter: PartyId::ZERO,
    };

    /// A session is placed once seller and arbiter are both set.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        !self.seller.is_zero() && !self.arbiter.is_zero()
    }

    /// The identity assigned to a role.
    #[must_use]
    pub fn get(&self, role: Role) -> PartyId {
        match role {
            Role::Buyer => self.buyer,
            Role::Seller => self.seller,
            Role::Arbiter => self.arbiter,
        }
    }
}

/// The four state-changing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Configure,
    Deposit,
    Release,
    Refund,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => write!(f, "configure"),
            Self::Deposit => write!(f, "deposit"),
            Self::Release => write!(f, "release"),
            Self::Refund => write!(f, "refund"),
        }
    }
}

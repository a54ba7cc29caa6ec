//! # triescrow-types
//!
//! Shared types, errors, and configuration for the **triescrow** three-party
//! escrow.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PartyId`], [`LogicalTime`]
//! - **Phase model**: [`Phase`]
//! - **Role model**: [`Role`], [`RoleSet`], [`Parties`], [`Action`]
//! - **Event model**: [`SessionEvent`], [`EventRecord`]
//! - **Configuration**: [`EscrowConfig`]
//! - **Errors**: [`EscrowError`] with `TE_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod phase;
pub mod role;

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use phase::*;
pub use role::*;

// Constants are accessed via `triescrow_types::constants::FOO`.

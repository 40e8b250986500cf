//! Stake registry: the membership, collateral, and reputation ledger for judges.
//!
//! Reputation changes through exactly three paths:
//! [`StakeRegistry::record_verdict_result`], [`StakeRegistry::apply_decay`] and
//! [`StakeRegistry::slash`]. No other component writes participant state.

pub mod error;
pub mod event;
pub mod participant;
pub mod registry;

pub use error::RegistryError;
pub use event::{DeactivationReason, RegistryEvent};
pub use participant::Participant;
pub use registry::StakeRegistry;

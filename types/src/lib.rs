//! Fundamental types for the Tribunal protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, case identifiers, content hashes, amounts and assets,
//! timestamps, verdicts, adjudication rounds, and the protocol parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod params;
pub mod round;
pub mod time;
pub mod verdict;

pub use address::AccountId;
pub use amount::{Amount, Asset, BPS_DENOMINATOR};
pub use error::TribunalError;
pub use hash::{CaseId, ContentHash};
pub use params::ProtocolParams;
pub use round::PanelRound;
pub use time::Timestamp;
pub use verdict::{Outcome, Verdict};

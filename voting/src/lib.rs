//! Sealed two-phase voting per panel.
//!
//! 1. **Commit**: each panel member submits `H(verdict || percent || salt)`.
//!    Once every member has committed the panel moves straight to reveal.
//! 2. **Reveal**: members disclose the preimage; it must hash to the stored
//!    commitment exactly. Members who never reveal can be penalized after the
//!    reveal deadline with a synthetic `Fail` vote.

pub mod error;
pub mod event;
pub mod panel;
pub mod voting;

pub use error::VotingError;
pub use event::VotingEvent;
pub use panel::{MemberRecord, Panel, RevealedVote, VotingPhase};
pub use voting::{CommitReceipt, CommitRevealVoting, RevealReceipt};

//! Escrow settlement: fund custody and the case state machine.
//!
//! A case moves `Pending → Submitted → Judging → Reveal → {Completed | Disputed}`,
//! with one escalation from a disputed standard round to an expanded round,
//! and `Cancelled` reachable only from `Pending`. Every transition goes
//! through [`CaseStatus::apply`].
//!
//! Settlement never pushes funds: it credits withdrawable balances that each
//! account pulls through [`EscrowSettlement::withdraw`].

pub mod arbitration;
pub mod case;
pub mod error;
pub mod escrow;
pub mod event;
pub mod funds;
pub mod settlement;
pub mod status;

pub use arbitration::{ArbitrationCommittee, ArbitrationPolicy, SingleArbitrator};
pub use case::{Ballot, Case, Dispute, NewCase};
pub use error::{EscrowError, FundsError};
pub use escrow::{EscrowSettlement, Resolution, SettledCase};
pub use event::CaseEvent;
pub use funds::{FundsGateway, LedgerGateway};
pub use settlement::{compute_payout, tally, Payout, Tally};
pub use status::{CaseStatus, Transition};

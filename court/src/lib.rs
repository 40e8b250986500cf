//! The adjudication court.
//!
//! [`Court`] owns the stake registry, panel selector, commit-reveal voting
//! and escrow, and routes every call between them. Components never hold
//! references to one another; the court is the only place they meet.

pub mod config;
pub mod court;
pub mod error;
pub mod event;
pub mod snapshot;

pub use config::CourtConfig;
pub use court::Court;
pub use error::CourtError;
pub use event::CourtEvent;
pub use snapshot::CourtSnapshot;

//! Nullable infrastructure for deterministic testing.
//!
//! The protocol takes time and randomness from outside. This crate provides
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the system clock or an entropy service
//!
//! Usage: swap real implementations for nullables in tests and the simulator.

pub mod clock;
pub mod random;

pub use clock::NullClock;
pub use random::NullRandom;

//! Hashing primitives for the Tribunal protocol.
//!
//! - **Blake2b-256** for every protocol hash (seeds, commitments, content references)
//! - Sealed-vote commitments: `H(tag || verdict || percent || salt)`

pub mod commitment;
pub mod hash;

pub use commitment::{commit_hash, derive_salt, Salt, COMMIT_DOMAIN_TAG};
pub use hash::{blake2b_256, blake2b_256_multi, content_hash};

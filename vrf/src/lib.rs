//! Randomness sources for judge panel selection.
//!
//! Panel selection never hard-wires an entropy source. Providers:
//! - [`ChainEntropy`]: recent block/host entropy mixed with the request
//!   context. Cheap, but whoever produces the entropy can bias it.
//! - [`HashChainBeacon`]: a pre-committed hash chain revealed one link per
//!   round. Every output can be checked against the published anchor.
//!
//! A verifiable-randomness oracle plugs in by implementing [`RandomnessProvider`].

pub mod chain_entropy;
pub mod error;
pub mod hash_chain;

pub use chain_entropy::ChainEntropy;
pub use error::RandomnessError;
pub use hash_chain::HashChainBeacon;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for providing randomness to panel selection.
pub trait RandomnessProvider: Send + Sync {
    /// Get randomness for a given context (e.g. case id and selection round).
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomnessError>;

    /// Verify that a randomness output was correctly generated for `context`.
    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomnessError>;

    /// Human-readable name of this provider.
    fn name(&self) -> &str;
}

/// Lets a host keep a handle on a provider it has handed to the selector,
/// e.g. to feed new entropy or reveal beacon links.
impl<T: RandomnessProvider + ?Sized> RandomnessProvider for Arc<T> {
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomnessError> {
        (**self).get_randomness(context)
    }

    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomnessError> {
        (**self).verify(context, output)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A random value with whatever proof its provider can offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomOutput {
    /// The random bytes (32 bytes).
    pub value: [u8; 32],
    /// Provider-specific proof (empty for unverifiable sources).
    pub proof: Vec<u8>,
    /// Round, height, or epoch the value was drawn from.
    pub round: u64,
}

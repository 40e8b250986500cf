//! Weak default: host-supplied chain entropy.
//!
//! The host feeds the latest block hash (or any recent entropy) together with
//! its height. Outputs are `H(entropy || height || context)`. Block producers
//! can grind this value, so deployments with real value at stake should use
//! a verifiable provider instead.

use crate::{RandomOutput, RandomnessError, RandomnessProvider};
use std::sync::RwLock;
use tribunal_crypto::blake2b_256_multi;

#[derive(Clone, Copy)]
struct EntropyState {
    entropy: [u8; 32],
    height: u64,
}

/// Randomness derived from the most recent chain entropy.
pub struct ChainEntropy {
    state: RwLock<Option<EntropyState>>,
}

impl ChainEntropy {
    /// A provider with no entropy yet; draws fail until [`ChainEntropy::update`].
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// A provider seeded with initial entropy.
    pub fn with_entropy(entropy: [u8; 32], height: u64) -> Self {
        Self {
            state: RwLock::new(Some(EntropyState { entropy, height })),
        }
    }

    /// Replace the entropy with a newer block's value.
    pub fn update(&self, entropy: [u8; 32], height: u64) {
        if let Ok(mut guard) = self.state.write() {
            *guard = Some(EntropyState { entropy, height });
            tracing::debug!(height, "chain entropy updated");
        }
    }

    fn current(&self) -> Result<EntropyState, RandomnessError> {
        let guard = self
            .state
            .read()
            .map_err(|_| RandomnessError::Unavailable("entropy lock poisoned".into()))?;
        (*guard).ok_or(RandomnessError::NoEntropy)
    }

    fn derive(state: &EntropyState, context: &[u8]) -> [u8; 32] {
        blake2b_256_multi(&[&state.entropy, &state.height.to_le_bytes(), context])
    }
}

impl Default for ChainEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomnessProvider for ChainEntropy {
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomnessError> {
        let state = self.current()?;
        Ok(RandomOutput {
            value: Self::derive(&state, context),
            proof: state.entropy.to_vec(),
            round: state.height,
        })
    }

    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomnessError> {
        let entropy: [u8; 32] = output
            .proof
            .as_slice()
            .try_into()
            .map_err(|_| RandomnessError::InvalidProof)?;
        let state = EntropyState {
            entropy,
            height: output.round,
        };
        Ok(Self::derive(&state, context) == output.value)
    }

    fn name(&self) -> &str {
        "chain-entropy"
    }
}

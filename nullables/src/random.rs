//! Nullable randomness: deterministic values for panel selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use tribunal_vrf::{RandomOutput, RandomnessError, RandomnessProvider};

/// A deterministic randomness provider.
///
/// Returns pre-configured values in order, cycling when exhausted. Each
/// output is mixed with the request context so two cases drawn from the
/// same configured value still differ.
pub struct NullRandom {
    outputs: Vec<[u8; 32]>,
    index: AtomicUsize,
}

impl NullRandom {
    /// Create with a sequence of deterministic random values.
    pub fn new(outputs: Vec<[u8; 32]>) -> Self {
        Self {
            outputs,
            index: AtomicUsize::new(0),
        }
    }

    /// Create with a single value that will be used for every call.
    pub fn constant(value: [u8; 32]) -> Self {
        Self::new(vec![value])
    }

    /// Create from a small integer seed.
    pub fn seeded(seed: u64) -> Self {
        Self::constant(tribunal_crypto::blake2b_256(&seed.to_le_bytes()))
    }

    fn mix(value: &[u8; 32], context: &[u8]) -> [u8; 32] {
        tribunal_crypto::blake2b_256_multi(&[value, context])
    }
}

impl RandomnessProvider for NullRandom {
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomnessError> {
        if self.outputs.is_empty() {
            return Err(RandomnessError::NoEntropy);
        }
        let current = self.index.fetch_add(1, Ordering::SeqCst) % self.outputs.len();
        Ok(RandomOutput {
            value: Self::mix(&self.outputs[current], context),
            proof: Vec::new(),
            round: current as u64,
        })
    }

    fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomnessError> {
        Ok(true) // Always valid in test mode
    }

    fn name(&self) -> &str {
        "null-random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_values() {
        let random = NullRandom::new(vec![[1u8; 32], [2u8; 32]]);
        let a = random.get_randomness(b"ctx").unwrap();
        let b = random.get_randomness(b"ctx").unwrap();
        let c = random.get_randomness(b"ctx").unwrap();
        assert_ne!(a.value, b.value);
        assert_eq!(a.value, c.value);
    }

    #[test]
    fn empty_sequence_has_no_entropy() {
        let random = NullRandom::new(Vec::new());
        assert!(random.get_randomness(b"ctx").is_err());
    }
}

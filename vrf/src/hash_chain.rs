//! Verifiable hash-chain beacon.
//!
//! The beacon operator picks a secret seed `x_n` and publishes the anchor
//! `x_0 = H^n(x_n)`. Each round reveals the next link `x_k` with
//! `H(x_k) = x_{k-1}`. Nobody can predict a link before it is revealed, and
//! anyone holding the anchor can check every output.

use crate::{RandomOutput, RandomnessError, RandomnessProvider};
use std::sync::RwLock;
use tribunal_crypto::{blake2b_256, blake2b_256_multi};

const BEACON_TAG: &[u8] = b"tribunal/beacon/v1";

struct ChainState {
    latest: [u8; 32],
    round: u64,
}

/// Randomness beacon backed by a pre-committed hash chain.
pub struct HashChainBeacon {
    anchor: [u8; 32],
    state: RwLock<ChainState>,
}

impl HashChainBeacon {
    /// Build the full chain `[x_0, x_1, .., x_length]` from a secret seed.
    ///
    /// `x_0` is the anchor to publish; the remaining links are revealed in order.
    pub fn build_chain(seed: [u8; 32], length: usize) -> Vec<[u8; 32]> {
        let mut links = Vec::with_capacity(length + 1);
        let mut current = seed;
        links.push(current);
        for _ in 0..length {
            current = blake2b_256(&current);
            links.push(current);
        }
        links.reverse();
        links
    }

    /// Track a chain from its published anchor.
    pub fn new(anchor: [u8; 32]) -> Self {
        Self {
            anchor,
            state: RwLock::new(ChainState {
                latest: anchor,
                round: 0,
            }),
        }
    }

    pub fn anchor(&self) -> [u8; 32] {
        self.anchor
    }

    /// Number of links revealed so far.
    pub fn round(&self) -> u64 {
        self.state.read().map(|s| s.round).unwrap_or(0)
    }

    /// Accept the next link of the chain.
    pub fn reveal(&self, link: [u8; 32]) -> Result<u64, RandomnessError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| RandomnessError::Unavailable("beacon lock poisoned".into()))?;
        if blake2b_256(&link) != state.latest {
            return Err(RandomnessError::BrokenChain);
        }
        state.latest = link;
        state.round += 1;
        tracing::debug!(round = state.round, "beacon link revealed");
        Ok(state.round)
    }

    fn derive(link: &[u8; 32], context: &[u8]) -> [u8; 32] {
        blake2b_256_multi(&[BEACON_TAG, link, context])
    }
}

impl RandomnessProvider for HashChainBeacon {
    fn get_randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomnessError> {
        let state = self
            .state
            .read()
            .map_err(|_| RandomnessError::Unavailable("beacon lock poisoned".into()))?;
        if state.round == 0 {
            return Err(RandomnessError::NoEntropy);
        }
        Ok(RandomOutput {
            value: Self::derive(&state.latest, context),
            proof: state.latest.to_vec(),
            round: state.round,
        })
    }

    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomnessError> {
        let link: [u8; 32] = output
            .proof
            .as_slice()
            .try_into()
            .map_err(|_| RandomnessError::InvalidProof)?;
        if output.round == 0 {
            return Ok(false);
        }
        let mut walked = link;
        for _ in 0..output.round {
            walked = blake2b_256(&walked);
        }
        Ok(walked == self.anchor && Self::derive(&link, context) == output.value)
    }

    fn name(&self) -> &str {
        "hash-chain-beacon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon_with_chain(length: usize) -> (HashChainBeacon, Vec<[u8; 32]>) {
        let chain = HashChainBeacon::build_chain([9u8; 32], length);
        (HashChainBeacon::new(chain[0]), chain)
    }

    #[test]
    fn links_reveal_in_order() {
        let (beacon, chain) = beacon_with_chain(4);
        assert_eq!(beacon.reveal(chain[1]).unwrap(), 1);
        assert_eq!(beacon.reveal(chain[2]).unwrap(), 2);
        assert_eq!(beacon.round(), 2);
    }

    #[test]
    fn out_of_order_link_is_rejected() {
        let (beacon, chain) = beacon_with_chain(4);
        assert_eq!(beacon.reveal(chain[2]).unwrap_err(), RandomnessError::BrokenChain);
        assert_eq!(beacon.round(), 0);
    }

    #[test]
    fn no_output_before_first_reveal() {
        let (beacon, _) = beacon_with_chain(2);
        assert_eq!(beacon.get_randomness(b"ctx").unwrap_err(), RandomnessError::NoEntropy);
    }

    #[test]
    fn outputs_verify_against_anchor() {
        let (beacon, chain) = beacon_with_chain(3);
        beacon.reveal(chain[1]).unwrap();
        beacon.reveal(chain[2]).unwrap();
        let out = beacon.get_randomness(b"case#7").unwrap();
        assert!(beacon.verify(b"case#7", &out).unwrap());

        let mut forged = out.clone();
        forged.proof = [1u8; 32].to_vec();
        assert!(!beacon.verify(b"case#7", &forged).unwrap());
    }

    #[test]
    fn output_serializes_to_json() {
        let (beacon, chain) = beacon_with_chain(1);
        beacon.reveal(chain[1]).unwrap();
        let out = beacon.get_randomness(b"ctx").unwrap();
        let json = serde_json::to_string(&out).unwrap();
        let back: RandomOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, out);
    }
}

//! Sealed-vote commitments.
//!
//! A judge commits to `H(COMMIT_DOMAIN_TAG || verdict || percent || salt)`.
//! The 32-byte salt makes the tiny verdict space impossible to brute-force
//! from the published hash.

use crate::hash::blake2b_256_multi;
use tribunal_types::{ContentHash, Verdict};

/// Domain separation for commitment preimages.
pub const COMMIT_DOMAIN_TAG: &[u8] = b"tribunal/commit/v1";

/// Secret salt chosen by the judge.
pub type Salt = [u8; 32];

/// Compute the commitment for a verdict, partial percentage, and salt.
pub fn commit_hash(verdict: Verdict, partial_percent: u8, salt: &Salt) -> ContentHash {
    ContentHash::new(blake2b_256_multi(&[
        COMMIT_DOMAIN_TAG,
        &[verdict.as_byte()],
        &[partial_percent],
        salt,
    ]))
}

/// Derive a salt deterministically from a judge-held secret and a label.
///
/// Clients that cannot store per-case randomness can keep one secret and
/// derive a fresh salt per case.
pub fn derive_salt(secret: &[u8], label: &[u8]) -> Salt {
    blake2b_256_multi(&[b"tribunal/salt/v1", secret, label])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_binds_every_field() {
        let salt = [7u8; 32];
        let base = commit_hash(Verdict::Partial, 40, &salt);
        assert_ne!(base, commit_hash(Verdict::Pass, 40, &salt));
        assert_ne!(base, commit_hash(Verdict::Partial, 41, &salt));
        assert_ne!(base, commit_hash(Verdict::Partial, 40, &[8u8; 32]));
        assert_eq!(base, commit_hash(Verdict::Partial, 40, &salt));
    }

    #[test]
    fn derived_salts_differ_per_label() {
        assert_ne!(derive_salt(b"secret", b"case#1"), derive_salt(b"secret", b"case#2"));
    }
}

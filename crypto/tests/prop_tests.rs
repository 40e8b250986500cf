use proptest::prelude::*;

use tribunal_crypto::commit_hash;
use tribunal_types::Verdict;

fn any_verdict() -> impl Strategy<Value = Verdict> {
    prop_oneof![Just(Verdict::Pass), Just(Verdict::Fail), Just(Verdict::Partial)]
}

proptest! {
    /// Two preimages collide only when they are identical.
    #[test]
    fn distinct_preimages_distinct_commitments(
        v1 in any_verdict(), p1 in 0u8..=100, s1 in prop::array::uniform32(0u8..),
        v2 in any_verdict(), p2 in 0u8..=100, s2 in prop::array::uniform32(0u8..),
    ) {
        let same = v1 == v2 && p1 == p2 && s1 == s2;
        prop_assert_eq!(commit_hash(v1, p1, &s1) == commit_hash(v2, p2, &s2), same);
    }
}

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tribunal_crypto::commit_hash;
use tribunal_types::{AccountId, CaseId, PanelRound, ProtocolParams, Timestamp, Verdict};
use tribunal_voting::CommitRevealVoting;

#[derive(Debug, Arbitrary)]
struct Input {
    committed: (u8, u8, [u8; 32]),
    revealed: (u8, u8, [u8; 32]),
}

fn verdict(tag: u8) -> Verdict {
    Verdict::ALL[(tag % 3) as usize]
}

// A reveal succeeds exactly when it matches the sealed preimage.
fuzz_target!(|input: Input| {
    let judge = AccountId::new("judge");
    let case = CaseId::new(1);
    let mut voting = CommitRevealVoting::new(ProtocolParams::default());
    voting
        .open_panel(case, PanelRound::Standard, vec![judge.clone()], Timestamp::new(0))
        .unwrap();

    let (cv, cp, cs) = input.committed;
    voting
        .submit_commit(case, &judge, commit_hash(verdict(cv), cp, &cs), Timestamp::new(1))
        .unwrap();

    let (rv, rp, rs) = input.revealed;
    let result = voting.reveal_verdict(case, &judge, verdict(rv), rp, rs, Timestamp::new(2));
    let same_preimage = verdict(cv) == verdict(rv) && cp == rp && cs == rs;
    let valid_percent = verdict(rv).validate_percent(rp).is_ok();
    assert_eq!(result.is_ok(), same_preimage && valid_percent);
});

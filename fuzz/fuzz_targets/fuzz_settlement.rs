#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tribunal_escrow::compute_payout;
use tribunal_types::{Amount, Outcome, Verdict};

#[derive(Debug, Arbitrary)]
struct Input {
    amount: u64,
    fee_bps: u16,
    verdict: u8,
    percent: u8,
    deduction: u64,
}

// Any valid outcome splits the escrowed amount exactly.
fuzz_target!(|input: Input| {
    let verdict = match input.verdict % 3 {
        0 => Verdict::Pass,
        1 => Verdict::Fail,
        _ => Verdict::Partial,
    };
    let Ok(outcome) = Outcome::new(verdict, input.percent) else {
        return;
    };
    let amount = Amount::new(input.amount as u128);
    let Some(fee) = amount.mul_bps((input.fee_bps % 10_001) as u32) else {
        return;
    };
    if let Ok(payout) = compute_payout(amount, fee, &outcome, Amount::new(input.deduction as u128)) {
        assert_eq!(payout.total(), Some(amount));
    }
});

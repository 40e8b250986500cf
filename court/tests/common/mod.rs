#![allow(dead_code)]

use tribunal_court::{Court, CourtConfig};
use tribunal_crypto::{commit_hash, content_hash, derive_salt, Salt};
use tribunal_escrow::{LedgerGateway, NewCase};
use tribunal_nullables::{NullClock, NullRandom};
use tribunal_types::{AccountId, Amount, Asset, CaseId, Verdict};

pub const DAY: u64 = 24 * 3600;
pub const JUDGE_STAKE: u128 = 2_000;

pub fn poster() -> AccountId {
    AccountId::new("poster")
}

pub fn worker() -> AccountId {
    AccountId::new("worker")
}

pub fn treasury() -> AccountId {
    AccountId::new("treasury")
}

pub fn owner() -> AccountId {
    AccountId::new("owner")
}

pub fn judge(i: usize) -> AccountId {
    AccountId::new(format!("judge_{i}"))
}

pub fn salt(case: CaseId, judge: &AccountId) -> Salt {
    derive_salt(judge.as_bytes(), &case.get().to_le_bytes())
}

pub struct Harness {
    pub court: Court<LedgerGateway>,
    pub clock: NullClock,
}

impl Harness {
    pub fn new(judges: usize) -> Self {
        Self::with_seed(judges, 7)
    }

    pub fn with_seed(judges: usize, seed: u64) -> Self {
        let mut ledger = LedgerGateway::new();
        ledger
            .deposit(&poster(), &Asset::Native, Amount::new(10_000))
            .unwrap();
        for i in 0..judges {
            ledger
                .deposit(&judge(i), &Asset::Native, Amount::new(5_000))
                .unwrap();
        }
        let mut court = Court::new(
            &CourtConfig::default(),
            Box::new(NullRandom::seeded(seed)),
            ledger,
        )
        .unwrap();
        let clock = NullClock::new(1_000);
        for i in 0..judges {
            court
                .register_judge(judge(i), Amount::new(JUDGE_STAKE), clock.now())
                .unwrap();
        }
        Self { court, clock }
    }

    pub fn create_case(&mut self, amount: u128) -> CaseId {
        let now = self.clock.now();
        self.court
            .create_case(
                NewCase {
                    poster: poster(),
                    asset: Asset::Native,
                    amount: Amount::new(amount),
                    deadline: now.plus(7 * DAY),
                    requirements: content_hash(b"requirements v1"),
                },
                now,
            )
            .unwrap()
    }

    /// Create, submit and seat a standard panel.
    pub fn open_case(&mut self, amount: u128) -> (CaseId, Vec<AccountId>) {
        let case = self.create_case(amount);
        let now = self.clock.advance(3600);
        self.court
            .submit_work(case, &worker(), content_hash(b"deliverable"), now)
            .unwrap();
        let now = self.clock.advance(60);
        let panel = self.court.assign_panel(case, now).unwrap();
        (case, panel)
    }

    pub fn commit(&mut self, case: CaseId, judge: &AccountId, verdict: Verdict, pct: u8) {
        let hash = commit_hash(verdict, pct, &salt(case, judge));
        let now = self.clock.advance(10);
        self.court.submit_commit(case, judge, hash, now).unwrap();
    }

    pub fn reveal(&mut self, case: CaseId, judge: &AccountId, verdict: Verdict, pct: u8) -> bool {
        let now = self.clock.advance(10);
        self.court
            .reveal_verdict(case, judge, verdict, pct, salt(case, judge), now)
            .unwrap()
    }

    /// Every listed judge commits, then every listed judge reveals.
    pub fn vote(&mut self, case: CaseId, panel: &[AccountId], votes: &[(Verdict, u8)]) {
        for (judge, (verdict, pct)) in panel.iter().zip(votes) {
            self.commit(case, judge, *verdict, *pct);
        }
        for (judge, (verdict, pct)) in panel.iter().zip(votes) {
            self.reveal(case, judge, *verdict, *pct);
        }
    }

    pub fn withdrawable(&self, account: &AccountId) -> Amount {
        self.court.escrow().withdrawable(account, &Asset::Native)
    }

    pub fn reputation(&self, account: &AccountId) -> u32 {
        self.court.registry().reputation(account).unwrap()
    }
}

pub fn votes(pass: usize, fail: usize) -> Vec<(Verdict, u8)> {
    std::iter::repeat((Verdict::Pass, 0))
        .take(pass)
        .chain(std::iter::repeat((Verdict::Fail, 0)).take(fail))
        .collect()
}

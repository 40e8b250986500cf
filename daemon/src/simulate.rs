//! Full case lifecycle on a simulated clock.

use anyhow::{bail, Context};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tribunal_court::{Court, CourtConfig, CourtEvent};
use tribunal_crypto::{blake2b_256, commit_hash, content_hash, derive_salt};
use tribunal_escrow::{LedgerGateway, NewCase, Resolution};
use tribunal_nullables::{NullClock, NullRandom};
use tribunal_types::{AccountId, Amount, Asset, CaseId, Outcome, PanelRound, Verdict};
use tribunal_vrf::{HashChainBeacon, RandomnessProvider};

const START_SECS: u64 = 1_700_000_000;
const DAY_SECS: u64 = 24 * 3600;
const BEACON_LINKS: usize = 8;

/// What one seated judge does in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimVote {
    /// Commit and reveal this ballot.
    Cast(Verdict, u8),
    /// Commit but never reveal.
    Silent,
    /// Never commit.
    Absent,
}

impl FromStr for SimVote {
    type Err = anyhow::Error;

    /// `pass`, `fail`, `partial:40`, `silent` or `absent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "silent" => return Ok(SimVote::Silent),
            "absent" => return Ok(SimVote::Absent),
            _ => {}
        }
        let (verdict, percent) = match s.split_once(':') {
            Some((v, p)) => (v, p.parse::<u8>().with_context(|| format!("bad percent in {s:?}"))?),
            None => (s.as_str(), 0),
        };
        let verdict = Verdict::from_str(verdict)?;
        verdict.validate_percent(percent)?;
        Ok(SimVote::Cast(verdict, percent))
    }
}

/// Parse an arbitrator ruling such as `fail` or `partial:30`.
pub fn parse_ruling(s: &str) -> anyhow::Result<(Verdict, u8)> {
    match SimVote::from_str(s)? {
        SimVote::Cast(verdict, percent) => Ok((verdict, percent)),
        other => bail!("{other:?} is not a ruling"),
    }
}

#[derive(Clone, Debug)]
pub struct SimulationPlan {
    pub judges: usize,
    pub amount: u128,
    pub votes: Vec<SimVote>,
    /// Votes for the expanded round, seated in panel order. Empty skips escalation.
    pub escalation_votes: Vec<SimVote>,
    pub ruling: Option<(Verdict, u8)>,
    /// Seeds a hash-chain beacon; without it draws use a fixed null source.
    pub seed: Option<Vec<u8>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Balance {
    pub account: AccountId,
    pub amount: Amount,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub case: CaseId,
    pub status: String,
    pub outcome: Option<Outcome>,
    pub panel: Vec<AccountId>,
    /// Ledger balances after every credit was withdrawn.
    pub balances: Vec<Balance>,
    pub events: Vec<CourtEvent>,
}

/// Randomness for the simulation, plus the beacon links still to reveal.
struct Entropy {
    beacon: Option<(Arc<HashChainBeacon>, Vec<[u8; 32]>)>,
    next: usize,
}

impl Entropy {
    fn new(seed: Option<&[u8]>) -> Self {
        let beacon = seed.map(|seed| {
            let chain = HashChainBeacon::build_chain(blake2b_256(seed), BEACON_LINKS);
            (Arc::new(HashChainBeacon::new(chain[0])), chain)
        });
        Self { beacon, next: 1 }
    }

    fn provider(&self) -> Box<dyn RandomnessProvider> {
        match &self.beacon {
            Some((beacon, _)) => Box::new(beacon.clone()),
            None => Box::new(NullRandom::seeded(0)),
        }
    }

    /// Publish the next beacon link before a draw.
    fn advance(&mut self) -> anyhow::Result<()> {
        if let Some((beacon, chain)) = &self.beacon {
            let link = chain
                .get(self.next)
                .copied()
                .context("beacon chain exhausted")?;
            let round = beacon.reveal(link)?;
            tracing::debug!(round, "simulated beacon advanced");
            self.next += 1;
        }
        Ok(())
    }
}

pub fn judge_id(index: usize) -> AccountId {
    AccountId::new(format!("judge_{index:02}"))
}

/// Run one case from creation to final balances.
pub fn run(config: &CourtConfig, plan: &SimulationPlan) -> anyhow::Result<SimulationReport> {
    if plan.amount == 0 {
        bail!("amount must be positive");
    }
    let poster = AccountId::new("poster");
    let worker = AccountId::new("worker");
    let judges: Vec<AccountId> = (0..plan.judges).map(judge_id).collect();
    let stake = Amount::new(config.params.min_stake as u128 * 2);

    let mut ledger = LedgerGateway::new();
    ledger.deposit(&poster, &Asset::Native, Amount::new(plan.amount))?;
    for judge in &judges {
        ledger.deposit(judge, &Asset::Native, stake)?;
    }

    let mut entropy = Entropy::new(plan.seed.as_deref());
    let mut court = Court::new(config, entropy.provider(), ledger)?;
    let clock = NullClock::new(START_SECS);
    for judge in &judges {
        court.register_judge(judge.clone(), stake, clock.now())?;
    }

    let case = court.create_case(
        NewCase {
            poster: poster.clone(),
            asset: Asset::Native,
            amount: Amount::new(plan.amount),
            deadline: clock.now().plus(7 * DAY_SECS),
            requirements: content_hash(b"simulated requirements"),
        },
        clock.now(),
    )?;
    court.submit_work(case, &worker, content_hash(b"simulated deliverable"), clock.advance(3600))?;

    entropy.advance()?;
    let mut panel = court.assign_panel(case, clock.advance(60))?;
    let mut resolution = run_round(&mut court, &clock, case, &panel, &plan.votes)?;

    if let Resolution::Disputed(dispute) = &resolution {
        if dispute.round == PanelRound::Standard && !plan.escalation_votes.is_empty() {
            entropy.advance()?;
            panel = court.escalate(case, clock.advance(60))?;
            resolution = run_round(&mut court, &clock, case, &panel, &plan.escalation_votes)?;
        }
    }

    if let (Resolution::Disputed(_), Some((verdict, percent))) = (&resolution, plan.ruling) {
        let arbitrator = config
            .arbitrators
            .first()
            .context("no arbitrator configured")?;
        court.resolve_dispute(case, arbitrator, verdict, percent, clock.advance(3600))?;
    }

    let mut accounts = vec![poster, worker, config.treasury.clone()];
    accounts.extend(judges);
    for account in &accounts {
        if !court.escrow().withdrawable(account, &Asset::Native).is_zero() {
            court.withdraw(account, &Asset::Native)?;
        }
    }

    let settled = court.escrow().case(case)?;
    let (status, outcome) = (settled.status.to_string(), settled.outcome);
    let balances = accounts
        .into_iter()
        .map(|account| Balance {
            amount: court.funds().balance(&account, &Asset::Native),
            account,
        })
        .collect();
    Ok(SimulationReport {
        case,
        status,
        outcome,
        panel,
        balances,
        events: court.drain_events(),
    })
}

/// Commit, reveal and tally one round; deadlines are forced as needed.
fn run_round(
    court: &mut Court<LedgerGateway>,
    clock: &NullClock,
    case: CaseId,
    panel: &[AccountId],
    votes: &[SimVote],
) -> anyhow::Result<Resolution> {
    let seated: Vec<(&AccountId, SimVote)> = panel
        .iter()
        .zip(votes.iter().copied().chain(std::iter::repeat(SimVote::Absent)))
        .collect();

    for (judge, vote) in &seated {
        let (verdict, percent) = match vote {
            SimVote::Cast(verdict, percent) => (*verdict, *percent),
            SimVote::Silent => (Verdict::Pass, 0),
            SimVote::Absent => continue,
        };
        let salt = derive_salt(judge.as_bytes(), &case.get().to_le_bytes());
        court.submit_commit(case, judge, commit_hash(verdict, percent, &salt), clock.advance(5))?;
    }
    if !court.voting().panel(case)?.all_committed() {
        let deadline = court.voting().panel(case)?.commit_deadline;
        clock.set(deadline.as_secs());
        court.close_commit_phase(case, clock.now())?;
    }

    for (judge, vote) in &seated {
        if let SimVote::Cast(verdict, percent) = vote {
            let salt = derive_salt(judge.as_bytes(), &case.get().to_le_bytes());
            court.reveal_verdict(case, judge, *verdict, *percent, salt, clock.advance(5))?;
        }
    }

    // Silent judges are penalized by the resolve call itself.
    if !court.escrow().case(case)?.all_voted() {
        let deadline = court.voting().panel(case)?.reveal_deadline;
        clock.set(deadline.as_secs());
    }

    Ok(court.resolve(case, clock.advance(1))?)
}

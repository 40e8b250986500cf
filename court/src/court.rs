//! The court context object.

use crate::config::CourtConfig;
use crate::error::CourtError;
use crate::event::CourtEvent;
use crate::snapshot::{CourtSnapshot, SNAPSHOT_VERSION};
use tribunal_crypto::Salt;
use tribunal_escrow::{
    ArbitrationPolicy, CaseStatus, EscrowSettlement, FundsGateway, NewCase, Resolution, SettledCase,
};
use tribunal_panel::{PanelSelector, SelectionRequest};
use tribunal_registry::StakeRegistry;
use tribunal_types::{
    AccountId, Amount, Asset, CaseId, ContentHash, PanelRound, ProtocolParams, Timestamp, Verdict,
};
use tribunal_vrf::RandomnessProvider;
use tribunal_voting::{CommitRevealVoting, RevealReceipt, VotingPhase};

/// Judges stake in the native asset.
const STAKE_ASSET: Asset = Asset::Native;

/// Owns the four protocol components and routes calls between them.
///
/// Every operation runs to completion before the next; hosts serving
/// concurrent callers wrap the court in a lock.
pub struct Court<F: FundsGateway> {
    params: ProtocolParams,
    registry: StakeRegistry,
    selector: PanelSelector,
    voting: CommitRevealVoting,
    escrow: EscrowSettlement,
    funds: F,
    arbitration: Box<dyn ArbitrationPolicy>,
    events: Vec<CourtEvent>,
}

impl<F: FundsGateway> Court<F> {
    pub fn new(
        config: &CourtConfig,
        randomness: Box<dyn RandomnessProvider>,
        funds: F,
    ) -> Result<Self, CourtError> {
        config.validate()?;
        let params = config.params.clone();
        tracing::info!(
            owner = %config.owner,
            treasury = %config.treasury,
            randomness = randomness.name(),
            panel_size = params.panel_size,
            "court initialised"
        );
        Ok(Self {
            registry: StakeRegistry::new(params.clone()),
            selector: PanelSelector::new(params.clone(), randomness),
            voting: CommitRevealVoting::new(params.clone()),
            escrow: EscrowSettlement::new(params.clone(), config.owner.clone(), config.treasury.clone()),
            arbitration: config.arbitration_policy(),
            funds,
            params,
            events: Vec::new(),
        })
    }

    // ── Judges ─────────────────────────────────────────────────────────────

    /// Collect `stake` from a judge and register them.
    pub fn register_judge(&mut self, id: AccountId, stake: Amount, now: Timestamp) -> Result<(), CourtError> {
        self.funds.collect(&id, &STAKE_ASSET, stake).map_err(tribunal_escrow::EscrowError::from)?;
        if let Err(e) = self.registry.register(id.clone(), stake, now) {
            self.refund_stake(&id, stake)?;
            return Err(e.into());
        }
        self.gather();
        Ok(())
    }

    pub fn increase_stake(&mut self, id: &AccountId, amount: Amount) -> Result<Amount, CourtError> {
        self.funds.collect(id, &STAKE_ASSET, amount).map_err(tribunal_escrow::EscrowError::from)?;
        let total = match self.registry.increase_stake(id, amount) {
            Ok(total) => total,
            Err(e) => {
                self.refund_stake(id, amount)?;
                return Err(e.into());
            }
        };
        self.gather();
        Ok(total)
    }

    /// Release stake to the judge's withdrawable balance.
    ///
    /// A judge seated on a case still in voting cannot drop below
    /// `min_stake` until that case leaves the commit or reveal phase.
    pub fn withdraw_stake(&mut self, id: &AccountId, amount: Amount) -> Result<Amount, CourtError> {
        let stake = self
            .registry
            .participant(id)
            .map(|p| p.stake)
            .ok_or_else(|| tribunal_registry::RegistryError::NotRegistered(id.clone()))?;
        let below_min = stake
            .checked_sub(amount)
            .is_some_and(|rest| rest.raw() < self.params.min_stake as u128);
        if below_min {
            if let Some(case) = self.seated_case(id) {
                return Err(CourtError::StakeLocked {
                    judge: id.clone(),
                    case,
                });
            }
        }
        let remaining = self.registry.withdraw_stake(id, amount)?;
        self.escrow.credit(id, &STAKE_ASSET, amount)?;
        self.gather();
        Ok(remaining)
    }

    pub fn reactivate(&mut self, id: &AccountId) -> Result<(), CourtError> {
        self.registry.reactivate(id)?;
        self.gather();
        Ok(())
    }

    /// Apply inactivity decay to one judge.
    pub fn apply_decay(&mut self, id: &AccountId, now: Timestamp) -> Result<u64, CourtError> {
        let periods = self.registry.apply_decay(id, now)?;
        self.gather();
        Ok(periods)
    }

    // ── Case lifecycle ─────────────────────────────────────────────────────

    pub fn create_case(&mut self, new: NewCase, now: Timestamp) -> Result<CaseId, CourtError> {
        let eligible = self.registry.eligible_count();
        let id = self.escrow.create_case(new, eligible, &mut self.funds, now)?;
        self.gather();
        Ok(id)
    }

    pub fn submit_work(
        &mut self,
        case_id: CaseId,
        worker: &AccountId,
        submission: ContentHash,
        now: Timestamp,
    ) -> Result<(), CourtError> {
        self.escrow.submit_work(case_id, worker, submission, now)?;
        self.gather();
        Ok(())
    }

    /// Draw a standard panel for a submitted case and open its commit phase.
    ///
    /// Stale reputations are decayed first so the draw weights are current.
    pub fn assign_panel(&mut self, case_id: CaseId, now: Timestamp) -> Result<Vec<AccountId>, CourtError> {
        let case = self.escrow.case(case_id)?;
        if case.status != CaseStatus::Submitted {
            return Err(tribunal_escrow::EscrowError::WrongState {
                case: case_id,
                status: case.status.to_string(),
                action: "assign_panel",
            }
            .into());
        }
        let request = SelectionRequest {
            case_id,
            poster: case.poster.clone(),
            worker: case.worker.clone(),
        };
        self.decay_pool(now)?;
        let draw = self.selector.select_panel(&request, &self.registry)?;
        let commit_deadline = now.plus(self.params.commit_window_secs);
        self.escrow
            .assign_panel(case_id, draw.members.clone(), commit_deadline)?;
        self.voting
            .open_panel(case_id, PanelRound::Standard, draw.members.clone(), now)?;
        self.gather();
        Ok(draw.members)
    }

    /// Widen a disputed standard panel and start the expanded round.
    /// Returns the full expanded panel.
    pub fn escalate(&mut self, case_id: CaseId, now: Timestamp) -> Result<Vec<AccountId>, CourtError> {
        let case = self.escrow.case(case_id)?;
        if case.status
            != (CaseStatus::Disputed {
                round: PanelRound::Standard,
            })
        {
            return Err(tribunal_escrow::EscrowError::WrongState {
                case: case_id,
                status: case.status.to_string(),
                action: "escalate",
            }
            .into());
        }
        let request = SelectionRequest {
            case_id,
            poster: case.poster.clone(),
            worker: case.worker.clone(),
        };
        let current = case.panel.clone();
        self.decay_pool(now)?;
        let draw = self.selector.expand_panel(&request, &current, &self.registry)?;
        let commit_deadline = now.plus(self.params.commit_window_secs);
        let members = self.escrow.escalate(case_id, draw.members, commit_deadline)?;
        self.voting
            .open_panel(case_id, PanelRound::Expanded, members.clone(), now)?;
        self.gather();
        Ok(members)
    }

    pub fn submit_commit(
        &mut self,
        case_id: CaseId,
        judge: &AccountId,
        commitment: ContentHash,
        now: Timestamp,
    ) -> Result<(), CourtError> {
        let receipt = self.voting.submit_commit(case_id, judge, commitment, now)?;
        if let Some(reveal_deadline) = receipt.reveal_opened {
            self.escrow.open_reveal(case_id, reveal_deadline)?;
        }
        self.gather();
        Ok(())
    }

    /// Open the reveal phase after the commit deadline. Anyone may call this.
    pub fn close_commit_phase(&mut self, case_id: CaseId, now: Timestamp) -> Result<Timestamp, CourtError> {
        let reveal_deadline = self.voting.close_commit_phase(case_id, now)?;
        self.escrow.open_reveal(case_id, reveal_deadline)?;
        self.gather();
        Ok(reveal_deadline)
    }

    /// Reveal a committed verdict and forward it for tallying. Returns
    /// whether every committed judge has now voted.
    pub fn reveal_verdict(
        &mut self,
        case_id: CaseId,
        judge: &AccountId,
        verdict: Verdict,
        partial_percent: u8,
        salt: Salt,
        now: Timestamp,
    ) -> Result<bool, CourtError> {
        let receipt = self
            .voting
            .reveal_verdict(case_id, judge, verdict, partial_percent, salt, now)?;
        self.forward_vote(case_id, &receipt)?;
        self.gather();
        Ok(receipt.all_revealed)
    }

    /// Record a synthetic `Fail` for a judge who committed but never
    /// revealed, and slash them. Anyone may call this after the reveal
    /// deadline.
    pub fn penalize_no_reveal(
        &mut self,
        case_id: CaseId,
        judge: &AccountId,
        now: Timestamp,
    ) -> Result<Amount, CourtError> {
        let receipt = self.voting.penalize_no_reveal(case_id, judge, now)?;
        let slashed = self.registry.slash(judge)?;
        self.forward_vote(case_id, &receipt)?;
        self.route_slashed()?;
        self.gather();
        Ok(slashed)
    }

    /// Tally the current round. Anyone may call this once every judge has
    /// voted or the reveal deadline has passed.
    ///
    /// Judges still holding an unrevealed commitment past the deadline are
    /// penalized before the tally, so calling order cannot change the outcome.
    pub fn resolve(&mut self, case_id: CaseId, now: Timestamp) -> Result<Resolution, CourtError> {
        self.penalize_overdue(case_id, now)?;
        let resolution = self.escrow.resolve(case_id, now)?;
        self.voting.close_panel(case_id)?;
        if let Resolution::Settled(settled) = &resolution {
            self.after_settlement(settled, now)?;
        }
        self.gather();
        Ok(resolution)
    }

    /// Settle a disputed case on an authorized arbitrator's ruling.
    pub fn resolve_dispute(
        &mut self,
        case_id: CaseId,
        arbitrator: &AccountId,
        verdict: Verdict,
        partial_percent: u8,
        now: Timestamp,
    ) -> Result<SettledCase, CourtError> {
        let settled = self.escrow.resolve_dispute(
            case_id,
            arbitrator,
            verdict,
            partial_percent,
            self.arbitration.as_ref(),
        )?;
        self.after_settlement(&settled, now)?;
        self.gather();
        Ok(settled)
    }

    pub fn cancel_case(&mut self, case_id: CaseId, caller: &AccountId) -> Result<Amount, CourtError> {
        let refund = self.escrow.cancel_case(case_id, caller)?;
        self.gather();
        Ok(refund)
    }

    /// Pay out everything credited to `account` in `asset`.
    pub fn withdraw(&mut self, account: &AccountId, asset: &Asset) -> Result<Amount, CourtError> {
        let amount = self.escrow.withdraw(account, asset, &mut self.funds)?;
        self.gather();
        Ok(amount)
    }

    // ── Owner controls ─────────────────────────────────────────────────────

    pub fn set_fail_deduction(&mut self, caller: &AccountId, amount: Amount) -> Result<(), CourtError> {
        self.escrow.set_fail_deduction(caller, amount)?;
        self.params.fail_operational_deduction = self.escrow.params().fail_operational_deduction;
        self.gather();
        Ok(())
    }

    pub fn set_treasury(&mut self, caller: &AccountId, treasury: AccountId) -> Result<(), CourtError> {
        self.escrow.set_treasury(caller, treasury)?;
        self.gather();
        Ok(())
    }

    pub fn set_arbitration_policy(
        &mut self,
        caller: &AccountId,
        policy: Box<dyn ArbitrationPolicy>,
    ) -> Result<(), CourtError> {
        self.escrow.ensure_owner(caller)?;
        tracing::info!(from = self.arbitration.name(), to = policy.name(), "arbitration policy replaced");
        self.arbitration = policy;
        Ok(())
    }

    pub fn set_randomness(
        &mut self,
        caller: &AccountId,
        randomness: Box<dyn RandomnessProvider>,
    ) -> Result<(), CourtError> {
        self.escrow.ensure_owner(caller)?;
        self.selector.set_randomness(randomness);
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn registry(&self) -> &StakeRegistry {
        &self.registry
    }

    pub fn selector(&self) -> &PanelSelector {
        &self.selector
    }

    pub fn voting(&self) -> &CommitRevealVoting {
        &self.voting
    }

    pub fn escrow(&self) -> &EscrowSettlement {
        &self.escrow
    }

    pub fn funds(&self) -> &F {
        &self.funds
    }

    pub fn funds_mut(&mut self) -> &mut F {
        &mut self.funds
    }

    /// Drain the combined audit trail.
    pub fn drain_events(&mut self) -> Vec<CourtEvent> {
        self.gather();
        std::mem::take(&mut self.events)
    }

    // ── Snapshots ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> CourtSnapshot {
        CourtSnapshot {
            version: SNAPSHOT_VERSION,
            registry: self.registry.clone(),
            history: self.selector.history().clone(),
            voting: self.voting.clone(),
            escrow: self.escrow.clone(),
        }
    }

    /// Rebuild a court from a snapshot and fresh external collaborators.
    pub fn restore(
        snapshot: CourtSnapshot,
        randomness: Box<dyn RandomnessProvider>,
        arbitration: Box<dyn ArbitrationPolicy>,
        funds: F,
    ) -> Result<Self, CourtError> {
        let params = snapshot.escrow.params().clone();
        params.validate()?;
        tracing::info!(
            cases = snapshot.escrow.cases().count(),
            judges = snapshot.registry.participants().count(),
            "court restored from snapshot"
        );
        Ok(Self {
            selector: PanelSelector::with_history(params.clone(), randomness, snapshot.history),
            registry: snapshot.registry,
            voting: snapshot.voting,
            escrow: snapshot.escrow,
            funds,
            arbitration,
            params,
            events: Vec::new(),
        })
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn forward_vote(&mut self, case_id: CaseId, receipt: &RevealReceipt) -> Result<(), CourtError> {
        let vote = &receipt.vote;
        self.escrow.record_verdict(
            case_id,
            &vote.participant,
            vote.verdict,
            vote.partial_percent,
            vote.synthetic,
        )?;
        Ok(())
    }

    /// Apply the no-reveal penalty to every committed judge who missed
    /// the reveal deadline of the case's open panel.
    fn penalize_overdue(&mut self, case_id: CaseId, now: Timestamp) -> Result<(), CourtError> {
        let overdue = match self.voting.panel(case_id) {
            Ok(panel) if panel.phase == VotingPhase::Reveal && now >= panel.reveal_deadline => {
                panel.pending_reveals()
            }
            _ => return Ok(()),
        };
        for judge in &overdue {
            let receipt = self.voting.penalize_no_reveal(case_id, judge, now)?;
            self.registry.slash(judge)?;
            self.forward_vote(case_id, &receipt)?;
        }
        self.route_slashed()
    }

    /// A case in commit or reveal on which `id` is seated.
    fn seated_case(&self, id: &AccountId) -> Option<CaseId> {
        self.escrow
            .cases()
            .find(|case| {
                matches!(case.status, CaseStatus::Judging { .. } | CaseStatus::Reveal { .. })
                    && case.panel.contains(id)
            })
            .map(|case| case.id)
    }

    /// Score each revealed vote against the outcome and update pair
    /// history. Synthetic no-reveal votes take no part.
    fn after_settlement(&mut self, settled: &SettledCase, now: Timestamp) -> Result<(), CourtError> {
        let revealed: Vec<_> = settled
            .ballots
            .iter()
            .filter(|(_, ballot)| !ballot.synthetic)
            .collect();
        for (judge, ballot) in &revealed {
            self.registry
                .record_verdict_result(judge, ballot.agrees_with(&settled.outcome), now)?;
        }
        for (i, (a, ballot_a)) in revealed.iter().enumerate() {
            for (b, ballot_b) in &revealed[i + 1..] {
                self.selector
                    .record_agreement(a, b, ballot_a.verdict == ballot_b.verdict);
            }
        }
        tracing::debug!(
            case = %settled.case_id,
            scored = revealed.len(),
            "judges scored against outcome"
        );
        self.route_slashed()
    }

    /// Move collateral slashed in the registry to the treasury.
    fn route_slashed(&mut self) -> Result<(), CourtError> {
        let slashed = self.registry.take_slashed();
        if !slashed.is_zero() {
            self.escrow.credit_treasury(&STAKE_ASSET, slashed)?;
        }
        Ok(())
    }

    fn refund_stake(&mut self, id: &AccountId, amount: Amount) -> Result<(), CourtError> {
        self.funds
            .pay_out(id, &STAKE_ASSET, amount)
            .map_err(tribunal_escrow::EscrowError::from)?;
        Ok(())
    }

    fn decay_pool(&mut self, now: Timestamp) -> Result<(), CourtError> {
        let ids: Vec<AccountId> = self
            .registry
            .participants()
            .filter(|p| p.active)
            .map(|p| p.id.clone())
            .collect();
        for id in ids {
            self.registry.apply_decay(&id, now)?;
        }
        Ok(())
    }

    fn gather(&mut self) {
        self.events
            .extend(self.registry.drain_events().into_iter().map(CourtEvent::Registry));
        self.events
            .extend(self.voting.drain_events().into_iter().map(CourtEvent::Voting));
        self.events
            .extend(self.escrow.drain_events().into_iter().map(CourtEvent::Case));
    }
}

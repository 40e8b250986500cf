//! The escrow engine.

use crate::arbitration::ArbitrationPolicy;
use crate::case::{Ballot, Case, Dispute, NewCase};
use crate::error::EscrowError;
use crate::event::CaseEvent;
use crate::funds::FundsGateway;
use crate::settlement::{compute_payout, tally, Payout, Tally};
use crate::status::{CaseStatus, Transition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tribunal_types::{
    AccountId, Amount, Asset, CaseId, ContentHash, Outcome, PanelRound, ProtocolParams, Timestamp,
    Verdict,
};

/// A case that has just settled, with the ballots of its final round so
/// callers can score the judges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettledCase {
    pub case_id: CaseId,
    pub outcome: Outcome,
    pub payout: Payout,
    pub ballots: Vec<(AccountId, Ballot)>,
    /// Settled by the arbitrator rather than by a supermajority.
    pub arbitrated: bool,
}

/// What [`EscrowSettlement::resolve`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Settled(SettledCase),
    Disputed(Dispute),
}

/// Fund custody and the case state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EscrowSettlement {
    params: ProtocolParams,
    owner: AccountId,
    treasury: AccountId,
    next_case: u64,
    cases: BTreeMap<CaseId, Case>,
    /// Credits awaiting withdrawal.
    withdrawable: BTreeMap<(AccountId, Asset), Amount>,
    #[serde(skip)]
    pending_events: Vec<CaseEvent>,
}

impl EscrowSettlement {
    pub fn new(params: ProtocolParams, owner: AccountId, treasury: AccountId) -> Self {
        Self {
            params,
            owner,
            treasury,
            next_case: 1,
            cases: BTreeMap::new(),
            withdrawable: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn treasury(&self) -> &AccountId {
        &self.treasury
    }

    // ── Case lifecycle ─────────────────────────────────────────────────────

    /// Open and fund a case.
    ///
    /// Fails fast when the eligible judge pool could not seat a panel.
    pub fn create_case(
        &mut self,
        new: NewCase,
        eligible_judges: usize,
        funds: &mut dyn FundsGateway,
        now: Timestamp,
    ) -> Result<CaseId, EscrowError> {
        if new.amount.is_zero() {
            return Err(EscrowError::ZeroAmount);
        }
        if new.deadline <= now {
            return Err(EscrowError::DeadlineInPast {
                deadline: new.deadline,
                now,
            });
        }
        let needed = PanelRound::Standard.panel_size(&self.params);
        if eligible_judges < needed {
            return Err(EscrowError::InsufficientJudgePool {
                eligible: eligible_judges,
                needed,
            });
        }
        let fee = new
            .amount
            .mul_bps(self.params.fee_bps)
            .ok_or(EscrowError::Overflow)?;

        funds.collect(&new.poster, &new.asset, new.amount)?;

        let id = CaseId::new(self.next_case);
        self.next_case += 1;
        let case = Case {
            id,
            poster: new.poster.clone(),
            worker: None,
            asset: new.asset.clone(),
            amount: new.amount,
            fee,
            created_at: now,
            deadline: new.deadline,
            requirements: new.requirements,
            submission: None,
            status: CaseStatus::Pending,
            outcome: None,
            panel: Vec::new(),
            commit_deadline: None,
            reveal_deadline: None,
            ballots: BTreeMap::new(),
            dispute: None,
        };
        self.cases.insert(id, case);
        tracing::info!(case = %id, poster = %new.poster, amount = %new.amount, %fee, "case created");
        self.pending_events.push(CaseEvent::CaseCreated {
            case: id,
            poster: new.poster,
            asset: new.asset,
            amount: new.amount,
            fee,
            deadline: new.deadline,
        });
        Ok(id)
    }

    /// Attach a worker's submission to a pending case.
    pub fn submit_work(
        &mut self,
        case_id: CaseId,
        worker: &AccountId,
        submission: ContentHash,
        now: Timestamp,
    ) -> Result<(), EscrowError> {
        let case = self.case_mut(case_id)?;
        let next = next_status(case, Transition::SubmitWork)?;
        if now >= case.deadline {
            return Err(EscrowError::SubmissionDeadlinePassed(case.deadline));
        }
        if worker == &case.poster {
            return Err(EscrowError::PosterCannotSubmit);
        }
        case.worker = Some(worker.clone());
        case.submission = Some(submission);
        case.status = next;
        tracing::info!(case = %case_id, %worker, "work submitted");
        self.pending_events.push(CaseEvent::WorkSubmitted {
            case: case_id,
            worker: worker.clone(),
            submission,
        });
        Ok(())
    }

    /// Seat the standard panel and open its commit phase.
    pub fn assign_panel(
        &mut self,
        case_id: CaseId,
        members: Vec<AccountId>,
        commit_deadline: Timestamp,
    ) -> Result<(), EscrowError> {
        let case = self.case_mut(case_id)?;
        let next = next_status(case, Transition::AssignPanel)?;
        validate_panel(case, &members)?;
        seat(case, members, commit_deadline, next);
        self.push_panel_event(case_id);
        Ok(())
    }

    /// Widen a disputed standard panel with `additional` judges. Every
    /// member of the widened panel votes again.
    pub fn escalate(
        &mut self,
        case_id: CaseId,
        additional: Vec<AccountId>,
        commit_deadline: Timestamp,
    ) -> Result<Vec<AccountId>, EscrowError> {
        let case = self.case_mut(case_id)?;
        let next = next_status(case, Transition::Escalate)?;
        let members: Vec<AccountId> = case.panel.iter().cloned().chain(additional).collect();
        validate_panel(case, &members)?;
        seat(case, members.clone(), commit_deadline, next);
        tracing::info!(case = %case_id, size = members.len(), "dispute escalated to expanded panel");
        self.push_panel_event(case_id);
        Ok(members)
    }

    /// Move a judging case into its reveal phase.
    pub fn open_reveal(&mut self, case_id: CaseId, reveal_deadline: Timestamp) -> Result<(), EscrowError> {
        let case = self.case_mut(case_id)?;
        case.status = next_status(case, Transition::OpenReveal)?;
        case.reveal_deadline = Some(reveal_deadline);
        tracing::debug!(case = %case_id, %reveal_deadline, "case entered reveal");
        self.pending_events.push(CaseEvent::RevealOpened {
            case: case_id,
            reveal_deadline,
        });
        Ok(())
    }

    /// Record a revealed (or synthetic) verdict. Returns whether every seated
    /// judge has now voted.
    pub fn record_verdict(
        &mut self,
        case_id: CaseId,
        participant: &AccountId,
        verdict: Verdict,
        partial_percent: u8,
        synthetic: bool,
    ) -> Result<bool, EscrowError> {
        let case = self.case_mut(case_id)?;
        if !matches!(case.status, CaseStatus::Reveal { .. }) {
            return Err(EscrowError::WrongState {
                case: case_id,
                status: case.status.to_string(),
                action: "record_verdict",
            });
        }
        if !case.on_panel(participant) {
            return Err(EscrowError::NotPanelMember(participant.clone()));
        }
        if case.ballots.contains_key(participant) {
            return Err(EscrowError::AlreadyVoted(participant.clone()));
        }
        verdict.validate_percent(partial_percent)?;
        case.ballots.insert(
            participant.clone(),
            Ballot {
                verdict,
                partial_percent,
                synthetic,
            },
        );
        let all_voted = case.all_voted();
        self.pending_events.push(CaseEvent::VerdictRecorded {
            case: case_id,
            participant: participant.clone(),
            verdict,
            partial_percent,
            synthetic,
        });
        Ok(all_voted)
    }

    /// Tally the current round. Anyone may call this once every judge has
    /// voted or the reveal deadline has passed.
    ///
    /// A supermajority settles the case; anything less opens a dispute and
    /// moves no funds.
    pub fn resolve(&mut self, case_id: CaseId, now: Timestamp) -> Result<Resolution, EscrowError> {
        let arbitration_window = self.params.arbitration_window_secs;
        let case = self.case(case_id)?;
        let round = match case.status {
            CaseStatus::Reveal { round } => round,
            _ => {
                return Err(EscrowError::WrongState {
                    case: case_id,
                    status: case.status.to_string(),
                    action: "resolve",
                })
            }
        };
        if !case.all_voted() {
            if let Some(deadline) = case.reveal_deadline.filter(|d| now < *d) {
                return Err(EscrowError::RevealStillOpen(deadline));
            }
        }
        let ballots: Vec<Ballot> = case.ballots.values().copied().collect();
        match tally(&ballots, round.supermajority(&self.params)) {
            Tally::Supermajority(outcome) => {
                let settled = self.settle(case_id, Transition::Settle(outcome), outcome, false)?;
                Ok(Resolution::Settled(settled))
            }
            Tally::NoSupermajority { pass, fail, partial } => {
                let case = self.case_mut(case_id)?;
                case.status = next_status(case, Transition::Dispute)?;
                let dispute = Dispute {
                    case_id,
                    round,
                    opened_at: now,
                    arbitration_deadline: now.plus(arbitration_window),
                    resolution: None,
                    resolved_by: None,
                };
                case.dispute = Some(dispute.clone());
                tracing::info!(case = %case_id, %round, pass, fail, partial, "no supermajority, dispute opened");
                self.pending_events.push(CaseEvent::DisputeOpened {
                    case: case_id,
                    round,
                    arbitration_deadline: dispute.arbitration_deadline,
                });
                Ok(Resolution::Disputed(dispute))
            }
        }
    }

    /// Settle a disputed case on the arbitrator's ruling.
    pub fn resolve_dispute(
        &mut self,
        case_id: CaseId,
        caller: &AccountId,
        verdict: Verdict,
        partial_percent: u8,
        policy: &dyn ArbitrationPolicy,
    ) -> Result<SettledCase, EscrowError> {
        let outcome = Outcome::new(verdict, partial_percent)?;
        let case = self.case(case_id)?;
        next_status(case, Transition::Arbitrate(outcome))?;
        if !policy.is_authorized(caller, case) {
            return Err(EscrowError::NotArbitrator(caller.clone()));
        }
        let settled = self.settle(case_id, Transition::Arbitrate(outcome), outcome, true)?;
        let case = self.case_mut(case_id)?;
        if let Some(dispute) = case.dispute.as_mut() {
            dispute.resolution = Some(outcome);
            dispute.resolved_by = Some(caller.clone());
        }
        tracing::info!(case = %case_id, arbitrator = %caller, policy = policy.name(), %outcome, "dispute resolved");
        self.pending_events.push(CaseEvent::DisputeResolved {
            case: case_id,
            arbitrator: caller.clone(),
            outcome,
        });
        Ok(settled)
    }

    /// Cancel a pending case and refund the poster in full.
    pub fn cancel_case(&mut self, case_id: CaseId, caller: &AccountId) -> Result<Amount, EscrowError> {
        let case = self.case(case_id)?;
        let next = next_status(case, Transition::Cancel)?;
        if caller != &case.poster {
            return Err(EscrowError::NotPoster(caller.clone()));
        }
        let (poster, asset, refund) = (case.poster.clone(), case.asset.clone(), case.amount);
        let credits = self.plan_credits(&[(poster, asset, refund)])?;
        self.case_mut(case_id)?.status = next;
        self.apply_credits(credits);
        tracing::info!(case = %case_id, %refund, "case cancelled");
        self.pending_events.push(CaseEvent::CaseCancelled {
            case: case_id,
            refund,
        });
        Ok(refund)
    }

    // ── Funds ──────────────────────────────────────────────────────────────

    /// Credit value already held in custody to an account.
    pub fn credit(&mut self, account: &AccountId, asset: &Asset, amount: Amount) -> Result<(), EscrowError> {
        let credits = self.plan_credits(&[(account.clone(), asset.clone(), amount)])?;
        self.apply_credits(credits);
        Ok(())
    }

    /// Credit the treasury (slashed collateral, for instance).
    pub fn credit_treasury(&mut self, asset: &Asset, amount: Amount) -> Result<(), EscrowError> {
        let treasury = self.treasury.clone();
        self.credit(&treasury, asset, amount)
    }

    pub fn withdrawable(&self, account: &AccountId, asset: &Asset) -> Amount {
        self.withdrawable
            .get(&(account.clone(), asset.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all credits awaiting withdrawal in `asset`.
    pub fn total_withdrawable(&self, asset: &Asset) -> Amount {
        self.withdrawable
            .iter()
            .filter(|((_, a), _)| a == asset)
            .fold(Amount::ZERO, |acc, (_, v)| acc.checked_add(*v).unwrap_or(acc))
    }

    /// Value locked in cases that have not yet settled.
    pub fn locked(&self, asset: &Asset) -> Amount {
        self.cases
            .values()
            .filter(|c| &c.asset == asset && !c.status.is_terminal())
            .fold(Amount::ZERO, |acc, c| acc.checked_add(c.amount).unwrap_or(acc))
    }

    /// Pay out everything credited to `account` in `asset`.
    ///
    /// The credit is cleared before the gateway is called and restored if
    /// the payout fails.
    pub fn withdraw(
        &mut self,
        account: &AccountId,
        asset: &Asset,
        funds: &mut dyn FundsGateway,
    ) -> Result<Amount, EscrowError> {
        let key = (account.clone(), asset.clone());
        let amount = match self.withdrawable.remove(&key) {
            Some(amount) if !amount.is_zero() => amount,
            _ => {
                return Err(EscrowError::NothingToWithdraw {
                    account: account.clone(),
                    asset: asset.clone(),
                })
            }
        };
        if let Err(e) = funds.pay_out(account, asset, amount) {
            tracing::warn!(%account, %asset, %amount, error = %e, "payout failed, credit restored");
            self.withdrawable.insert(key, amount);
            return Err(e.into());
        }
        tracing::info!(%account, %asset, %amount, gateway = funds.name(), "withdrawn");
        self.pending_events.push(CaseEvent::Withdrawn {
            account: account.clone(),
            asset: asset.clone(),
            amount,
        });
        Ok(amount)
    }

    // ── Owner controls ─────────────────────────────────────────────────────

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), EscrowError> {
        if caller != &self.owner {
            return Err(EscrowError::NotOwner(caller.clone()));
        }
        Ok(())
    }

    /// Adjust the flat deduction taken from Fail refunds.
    pub fn set_fail_deduction(&mut self, caller: &AccountId, amount: Amount) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        let raw = u64::try_from(amount.raw()).map_err(|_| EscrowError::Overflow)?;
        let from = Amount::new(self.params.fail_operational_deduction as u128);
        self.params.fail_operational_deduction = raw;
        tracing::info!(%from, to = %amount, "fail deduction changed");
        self.pending_events.push(CaseEvent::FailDeductionChanged { from, to: amount });
        Ok(())
    }

    pub fn set_treasury(&mut self, caller: &AccountId, treasury: AccountId) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        let from = std::mem::replace(&mut self.treasury, treasury.clone());
        tracing::info!(%from, to = %treasury, "treasury changed");
        self.pending_events.push(CaseEvent::TreasuryChanged { from, to: treasury });
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────────────────

    pub fn case(&self, case_id: CaseId) -> Result<&Case, EscrowError> {
        self.cases.get(&case_id).ok_or(EscrowError::CaseNotFound(case_id))
    }

    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.cases.values()
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<CaseEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn case_mut(&mut self, case_id: CaseId) -> Result<&mut Case, EscrowError> {
        self.cases
            .get_mut(&case_id)
            .ok_or(EscrowError::CaseNotFound(case_id))
    }

    /// Finalize status, then credit the payout. Nothing changes unless
    /// every step can succeed.
    fn settle(
        &mut self,
        case_id: CaseId,
        transition: Transition,
        outcome: Outcome,
        arbitrated: bool,
    ) -> Result<SettledCase, EscrowError> {
        let fail_deduction = Amount::new(self.params.fail_operational_deduction as u128);
        let treasury = self.treasury.clone();
        let case = self.case(case_id)?;
        let next = next_status(case, transition)?;
        let payout = compute_payout(case.amount, case.fee, &outcome, fail_deduction)?;

        let mut credits = vec![
            (case.poster.clone(), case.asset.clone(), payout.poster),
            (treasury, case.asset.clone(), payout.treasury),
        ];
        if let Some(worker) = &case.worker {
            credits.push((worker.clone(), case.asset.clone(), payout.worker));
        } else if !payout.worker.is_zero() {
            return Err(EscrowError::WrongState {
                case: case_id,
                status: case.status.to_string(),
                action: "settle",
            });
        }
        let ballots = case.ballots_in_order();
        let planned = self.plan_credits(&credits)?;

        let case = self.case_mut(case_id)?;
        case.status = next;
        case.outcome = Some(outcome);
        self.apply_credits(planned);

        tracing::info!(
            case = %case_id,
            %outcome,
            worker = %payout.worker,
            poster = %payout.poster,
            treasury = %payout.treasury,
            arbitrated,
            "case settled"
        );
        self.pending_events.push(CaseEvent::FundsReleased {
            case: case_id,
            outcome,
            payout,
        });
        Ok(SettledCase {
            case_id,
            outcome,
            payout,
            ballots,
            arbitrated,
        })
    }

    /// Compute the balances that crediting would produce, failing on overflow.
    fn plan_credits(
        &self,
        credits: &[(AccountId, Asset, Amount)],
    ) -> Result<Vec<((AccountId, Asset), Amount, Amount)>, EscrowError> {
        let mut planned: BTreeMap<(AccountId, Asset), (Amount, Amount)> = BTreeMap::new();
        for (account, asset, amount) in credits {
            if amount.is_zero() {
                continue;
            }
            let key = (account.clone(), asset.clone());
            let current = match planned.get(&key) {
                Some((balance, _)) => *balance,
                None => self.withdrawable.get(&key).copied().unwrap_or_default(),
            };
            let added = planned.get(&key).map(|(_, a)| *a).unwrap_or_default();
            planned.insert(
                key,
                (
                    current.checked_add(*amount).ok_or(EscrowError::Overflow)?,
                    added.checked_add(*amount).ok_or(EscrowError::Overflow)?,
                ),
            );
        }
        Ok(planned
            .into_iter()
            .map(|(key, (balance, added))| (key, balance, added))
            .collect())
    }

    fn apply_credits(&mut self, planned: Vec<((AccountId, Asset), Amount, Amount)>) {
        for ((account, asset), balance, added) in planned {
            self.withdrawable
                .insert((account.clone(), asset.clone()), balance);
            self.pending_events.push(CaseEvent::Credited {
                account,
                asset,
                amount: added,
            });
        }
    }

    fn push_panel_event(&mut self, case_id: CaseId) {
        if let Some(case) = self.cases.get(&case_id) {
            if let (Some(round), Some(commit_deadline)) = (case.status.round(), case.commit_deadline) {
                tracing::info!(case = %case_id, %round, size = case.panel.len(), "panel assigned");
                self.pending_events.push(CaseEvent::PanelAssigned {
                    case: case_id,
                    round,
                    members: case.panel.clone(),
                    commit_deadline,
                });
            }
        }
    }
}

fn next_status(case: &Case, transition: Transition) -> Result<CaseStatus, EscrowError> {
    case.status
        .apply(transition)
        .ok_or_else(|| EscrowError::WrongState {
            case: case.id,
            status: case.status.to_string(),
            action: transition.name(),
        })
}

fn validate_panel(case: &Case, members: &[AccountId]) -> Result<(), EscrowError> {
    let distinct: BTreeSet<&AccountId> = members.iter().collect();
    if members.is_empty() || distinct.len() != members.len() || members.iter().any(|m| case.is_party(m)) {
        return Err(EscrowError::InvalidPanel);
    }
    Ok(())
}

fn seat(case: &mut Case, members: Vec<AccountId>, commit_deadline: Timestamp, next: CaseStatus) {
    case.panel = members;
    case.ballots.clear();
    case.commit_deadline = Some(commit_deadline);
    case.reveal_deadline = None;
    case.status = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::SingleArbitrator;
    use crate::funds::LedgerGateway;

    const DAY: u64 = 24 * 3600;

    fn poster() -> AccountId {
        AccountId::new("poster")
    }
    fn worker() -> AccountId {
        AccountId::new("worker")
    }
    fn judge(i: usize) -> AccountId {
        AccountId::new(format!("judge_{i}"))
    }
    fn judges(range: std::ops::Range<usize>) -> Vec<AccountId> {
        range.map(judge).collect()
    }

    fn setup(amount: u128) -> (EscrowSettlement, LedgerGateway, CaseId) {
        let mut ledger = LedgerGateway::new();
        ledger.deposit(&poster(), &Asset::Native, Amount::new(amount)).unwrap();
        let mut escrow = EscrowSettlement::new(
            ProtocolParams::default(),
            AccountId::new("owner"),
            AccountId::new("treasury"),
        );
        let id = escrow
            .create_case(
                NewCase {
                    poster: poster(),
                    asset: Asset::Native,
                    amount: Amount::new(amount),
                    deadline: Timestamp::new(10 * DAY),
                    requirements: ContentHash::new([1; 32]),
                },
                5,
                &mut ledger,
                Timestamp::new(0),
            )
            .unwrap();
        (escrow, ledger, id)
    }

    fn into_reveal(escrow: &mut EscrowSettlement, id: CaseId) {
        escrow
            .submit_work(id, &worker(), ContentHash::new([2; 32]), Timestamp::new(DAY))
            .unwrap();
        escrow.assign_panel(id, judges(0..5), Timestamp::new(2 * DAY)).unwrap();
        escrow.open_reveal(id, Timestamp::new(3 * DAY)).unwrap();
    }

    fn vote_all(escrow: &mut EscrowSettlement, id: CaseId, verdicts: &[Verdict]) {
        for (i, v) in verdicts.iter().enumerate() {
            escrow.record_verdict(id, &judge(i), *v, 0, false).unwrap();
        }
    }

    #[test]
    fn create_requires_pool_and_funds() {
        let mut ledger = LedgerGateway::new();
        let mut escrow = EscrowSettlement::new(ProtocolParams::default(), poster(), poster());
        let new = NewCase {
            poster: poster(),
            asset: Asset::Native,
            amount: Amount::new(100),
            deadline: Timestamp::new(100),
            requirements: ContentHash::ZERO,
        };
        let err = escrow
            .create_case(new.clone(), 4, &mut ledger, Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err.code(), "case_insufficient_pool");
        let err = escrow
            .create_case(new, 5, &mut ledger, Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err.code(), "funds_insufficient_balance");
        assert_eq!(escrow.cases().count(), 0);
    }

    #[test]
    fn fee_fixed_at_creation() {
        let (escrow, ledger, id) = setup(1000);
        assert_eq!(escrow.case(id).unwrap().fee, Amount::new(20));
        assert_eq!(ledger.custody(&Asset::Native), Amount::new(1000));
        assert_eq!(escrow.locked(&Asset::Native), Amount::new(1000));
    }

    #[test]
    fn submission_rules() {
        let (mut escrow, _ledger, id) = setup(1000);
        let err = escrow
            .submit_work(id, &poster(), ContentHash::ZERO, Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err.code(), "case_poster_cannot_submit");
        let err = escrow
            .submit_work(id, &worker(), ContentHash::ZERO, Timestamp::new(10 * DAY))
            .unwrap_err();
        assert_eq!(err.code(), "case_submission_deadline_passed");
        escrow
            .submit_work(id, &worker(), ContentHash::ZERO, Timestamp::new(1))
            .unwrap();
        let err = escrow
            .submit_work(id, &AccountId::new("late"), ContentHash::ZERO, Timestamp::new(2))
            .unwrap_err();
        assert_eq!(err.code(), "case_wrong_state");
    }

    #[test]
    fn panel_cannot_seat_parties() {
        let (mut escrow, _ledger, id) = setup(1000);
        escrow
            .submit_work(id, &worker(), ContentHash::ZERO, Timestamp::new(1))
            .unwrap();
        let mut panel = judges(0..4);
        panel.push(worker());
        let err = escrow.assign_panel(id, panel, Timestamp::new(DAY)).unwrap_err();
        assert_eq!(err, EscrowError::InvalidPanel);
        let err = escrow
            .assign_panel(id, vec![judge(0), judge(0)], Timestamp::new(DAY))
            .unwrap_err();
        assert_eq!(err, EscrowError::InvalidPanel);
    }

    #[test]
    fn four_of_five_pass_settles() {
        let (mut escrow, mut ledger, id) = setup(1000);
        into_reveal(&mut escrow, id);
        vote_all(
            &mut escrow,
            id,
            &[Verdict::Pass, Verdict::Pass, Verdict::Pass, Verdict::Pass, Verdict::Fail],
        );
        let resolution = escrow.resolve(id, Timestamp::new(DAY + 10)).unwrap();
        let Resolution::Settled(settled) = resolution else {
            panic!("expected settlement");
        };
        assert_eq!(settled.outcome, Outcome::pass());
        assert_eq!(settled.ballots.len(), 5);
        assert_eq!(escrow.withdrawable(&worker(), &Asset::Native), Amount::new(980));
        assert_eq!(
            escrow.withdrawable(&AccountId::new("treasury"), &Asset::Native),
            Amount::new(20)
        );
        assert_eq!(escrow.withdrawable(&poster(), &Asset::Native), Amount::ZERO);

        escrow.withdraw(&worker(), &Asset::Native, &mut ledger).unwrap();
        assert_eq!(ledger.balance(&worker(), &Asset::Native), Amount::new(980));

        let err = escrow.resolve(id, Timestamp::new(5 * DAY)).unwrap_err();
        assert_eq!(err.code(), "case_wrong_state");
        assert_eq!(escrow.withdrawable(&worker(), &Asset::Native), Amount::ZERO);
    }

    #[test]
    fn three_two_split_disputes_without_moving_funds() {
        let (mut escrow, _ledger, id) = setup(1000);
        into_reveal(&mut escrow, id);
        vote_all(
            &mut escrow,
            id,
            &[Verdict::Pass, Verdict::Pass, Verdict::Pass, Verdict::Fail, Verdict::Fail],
        );
        let resolution = escrow.resolve(id, Timestamp::new(DAY + 10)).unwrap();
        assert!(matches!(resolution, Resolution::Disputed(_)));
        assert_eq!(
            escrow.case(id).unwrap().status,
            CaseStatus::Disputed { round: PanelRound::Standard }
        );
        assert_eq!(escrow.total_withdrawable(&Asset::Native), Amount::ZERO);
        assert_eq!(escrow.locked(&Asset::Native), Amount::new(1000));
    }

    #[test]
    fn resolve_waits_for_votes_or_deadline() {
        let (mut escrow, _ledger, id) = setup(1000);
        into_reveal(&mut escrow, id);
        vote_all(&mut escrow, id, &[Verdict::Pass; 4]);
        let err = escrow.resolve(id, Timestamp::new(3 * DAY - 1)).unwrap_err();
        assert_eq!(err.code(), "case_reveal_still_open");
        let resolution = escrow.resolve(id, Timestamp::new(3 * DAY)).unwrap();
        assert!(matches!(resolution, Resolution::Settled(_)));
    }

    #[test]
    fn verdict_recording_rules() {
        let (mut escrow, _ledger, id) = setup(1000);
        into_reveal(&mut escrow, id);
        let err = escrow
            .record_verdict(id, &AccountId::new("stranger"), Verdict::Pass, 0, false)
            .unwrap_err();
        assert_eq!(err.code(), "case_not_panel_member");
        let err = escrow
            .record_verdict(id, &judge(0), Verdict::Partial, 0, false)
            .unwrap_err();
        assert_eq!(err.code(), "case_invalid_outcome");
        escrow.record_verdict(id, &judge(0), Verdict::Pass, 0, false).unwrap();
        let err = escrow
            .record_verdict(id, &judge(0), Verdict::Fail, 0, false)
            .unwrap_err();
        assert_eq!(err.code(), "case_already_voted");
    }

    #[test]
    fn escalation_widens_and_resets_ballots() {
        let (mut escrow, _ledger, id) = setup(1000);
        into_reveal(&mut escrow, id);
        vote_all(
            &mut escrow,
            id,
            &[Verdict::Pass, Verdict::Pass, Verdict::Fail, Verdict::Fail, Verdict::Pass],
        );
        escrow.resolve(id, Timestamp::new(DAY + 10)).unwrap();

        let err = escrow
            .escalate(id, vec![judge(0)], Timestamp::new(5 * DAY))
            .unwrap_err();
        assert_eq!(err, EscrowError::InvalidPanel);

        let members = escrow.escalate(id, judges(5..9), Timestamp::new(5 * DAY)).unwrap();
        assert_eq!(members.len(), 9);
        let case = escrow.case(id).unwrap();
        assert!(case.ballots.is_empty());
        assert_eq!(case.status, CaseStatus::Judging { round: PanelRound::Expanded });

        escrow.open_reveal(id, Timestamp::new(6 * DAY)).unwrap();
        let verdicts = [Verdict::Fail; 6]
            .into_iter()
            .chain([Verdict::Pass; 3])
            .collect::<Vec<_>>();
        vote_all(&mut escrow, id, &verdicts);
        let Resolution::Settled(settled) = escrow.resolve(id, Timestamp::new(5 * DAY + 1)).unwrap() else {
            panic!("expected settlement");
        };
        assert_eq!(settled.outcome, Outcome::fail());
        assert_eq!(escrow.withdrawable(&poster(), &Asset::Native), Amount::new(1000));
    }

    #[test]
    fn arbitrator_settles_disputes_only() {
        let (mut escrow, _ledger, id) = setup(1000);
        let policy = SingleArbitrator::new(AccountId::new("arbiter"));
        let err = escrow
            .resolve_dispute(id, &AccountId::new("arbiter"), Verdict::Pass, 0, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "case_wrong_state");

        into_reveal(&mut escrow, id);
        vote_all(&mut escrow, id, &[Verdict::Pass, Verdict::Pass, Verdict::Fail]);
        escrow.resolve(id, Timestamp::new(3 * DAY)).unwrap();

        let err = escrow
            .resolve_dispute(id, &judge(0), Verdict::Pass, 0, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "dispute_not_arbitrator");
        let err = escrow
            .resolve_dispute(id, &AccountId::new("arbiter"), Verdict::Partial, 100, &policy)
            .unwrap_err();
        assert_eq!(err.code(), "case_invalid_outcome");

        let settled = escrow
            .resolve_dispute(id, &AccountId::new("arbiter"), Verdict::Partial, 25, &policy)
            .unwrap();
        assert!(settled.arbitrated);
        assert_eq!(escrow.withdrawable(&worker(), &Asset::Native), Amount::new(245));
        assert_eq!(escrow.withdrawable(&poster(), &Asset::Native), Amount::new(750));
        assert_eq!(
            escrow.withdrawable(&AccountId::new("treasury"), &Asset::Native),
            Amount::new(5)
        );
        let dispute = escrow.case(id).unwrap().dispute.clone().unwrap();
        assert_eq!(dispute.resolved_by, Some(AccountId::new("arbiter")));
    }

    #[test]
    fn cancel_is_poster_only_and_pending_only() {
        let (mut escrow, mut ledger, id) = setup(500);
        let err = escrow.cancel_case(id, &worker()).unwrap_err();
        assert_eq!(err.code(), "case_not_poster");
        assert_eq!(escrow.cancel_case(id, &poster()).unwrap(), Amount::new(500));
        escrow.withdraw(&poster(), &Asset::Native, &mut ledger).unwrap();
        assert_eq!(ledger.balance(&poster(), &Asset::Native), Amount::new(500));

        let (mut escrow, _ledger, id) = setup(500);
        escrow
            .submit_work(id, &worker(), ContentHash::ZERO, Timestamp::new(1))
            .unwrap();
        let err = escrow.cancel_case(id, &poster()).unwrap_err();
        assert_eq!(err.code(), "case_wrong_state");
    }

    #[test]
    fn failed_payout_restores_credit() {
        let (mut escrow, mut ledger, id) = setup(300);
        escrow.cancel_case(id, &poster()).unwrap();
        ledger.freeze(&poster());
        let err = escrow.withdraw(&poster(), &Asset::Native, &mut ledger).unwrap_err();
        assert_eq!(err.code(), "funds_payout_failed");
        assert_eq!(escrow.withdrawable(&poster(), &Asset::Native), Amount::new(300));
        let err = escrow
            .withdraw(&worker(), &Asset::Native, &mut ledger)
            .unwrap_err();
        assert_eq!(err.code(), "funds_nothing_to_withdraw");
    }

    #[test]
    fn owner_adjusts_fail_deduction() {
        let (mut escrow, _ledger, id) = setup(1000);
        let err = escrow
            .set_fail_deduction(&poster(), Amount::new(10))
            .unwrap_err();
        assert_eq!(err.code(), "escrow_not_owner");
        escrow
            .set_fail_deduction(&AccountId::new("owner"), Amount::new(10))
            .unwrap();
        into_reveal(&mut escrow, id);
        vote_all(&mut escrow, id, &[Verdict::Fail; 5]);
        escrow.resolve(id, Timestamp::new(DAY)).unwrap();
        assert_eq!(escrow.withdrawable(&poster(), &Asset::Native), Amount::new(990));
        assert_eq!(
            escrow.withdrawable(&AccountId::new("treasury"), &Asset::Native),
            Amount::new(10)
        );
    }
}

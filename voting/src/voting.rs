//! Commit-reveal engine.

use crate::error::VotingError;
use crate::event::VotingEvent;
use crate::panel::{MemberRecord, Panel, RevealedVote, VotingPhase};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tribunal_crypto::{commit_hash, Salt};
use tribunal_types::{AccountId, CaseId, ContentHash, PanelRound, ProtocolParams, Timestamp, Verdict};

/// Result of an accepted commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Set when this commitment completed the panel and opened the reveal phase.
    pub reveal_opened: Option<Timestamp>,
}

/// Result of an accepted reveal (or injected no-reveal vote).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReceipt {
    pub vote: RevealedVote,
    /// Every committed member now has a vote; the panel is closed.
    pub all_revealed: bool,
}

/// Sealed voting for every open panel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitRevealVoting {
    params: ProtocolParams,
    panels: BTreeMap<CaseId, Panel>,
    #[serde(skip)]
    pending_events: Vec<VotingEvent>,
}

impl CommitRevealVoting {
    pub fn new(params: ProtocolParams) -> Self {
        Self {
            params,
            panels: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    /// Seat a panel and open its commit phase.
    ///
    /// Opening an expanded round replaces the case's previous panel; every
    /// member, old and new, votes afresh.
    pub fn open_panel(
        &mut self,
        case_id: CaseId,
        round: PanelRound,
        members: Vec<AccountId>,
        now: Timestamp,
    ) -> Result<&Panel, VotingError> {
        let records: BTreeMap<AccountId, MemberRecord> = members
            .iter()
            .map(|m| (m.clone(), MemberRecord::default()))
            .collect();
        if members.is_empty() || records.len() != members.len() {
            return Err(VotingError::InvalidMembership(case_id));
        }
        let commit_deadline = now.plus(self.params.commit_window_secs);
        let panel = Panel {
            case_id,
            round,
            members: members.clone(),
            phase: VotingPhase::Commit,
            commit_deadline,
            reveal_deadline: commit_deadline.plus(self.params.reveal_window_secs),
            records,
        };
        tracing::info!(case = %case_id, %round, size = members.len(), %commit_deadline, "commit phase opened");
        self.pending_events.push(VotingEvent::PanelOpened {
            case: case_id,
            round,
            members,
            commit_deadline,
        });
        self.panels.insert(case_id, panel);
        self.panel(case_id)
    }

    /// Submit a sealed commitment.
    pub fn submit_commit(
        &mut self,
        case_id: CaseId,
        participant: &AccountId,
        commitment: ContentHash,
        now: Timestamp,
    ) -> Result<CommitReceipt, VotingError> {
        let reveal_window = self.params.reveal_window_secs;
        let panel = self.panel_mut(case_id)?;
        expect_phase(panel, VotingPhase::Commit)?;
        if now >= panel.commit_deadline {
            return Err(VotingError::CommitDeadlinePassed(panel.commit_deadline));
        }
        let already_used = panel
            .records
            .iter()
            .any(|(m, r)| m != participant && r.commitment == Some(commitment));
        let record = panel
            .records
            .get_mut(participant)
            .ok_or_else(|| VotingError::NotPanelMember(participant.clone()))?;
        if record.commitment.is_some() {
            return Err(VotingError::AlreadyCommitted(participant.clone()));
        }
        if already_used {
            return Err(VotingError::CommitmentReused);
        }
        record.commitment = Some(commitment);

        let reveal_opened = if panel.all_committed() {
            Some(open_reveal(panel, now, reveal_window))
        } else {
            None
        };
        tracing::debug!(case = %case_id, %participant, "commitment accepted");
        self.pending_events.push(VotingEvent::Committed {
            case: case_id,
            participant: participant.clone(),
            commitment,
        });
        if let Some(reveal_deadline) = reveal_opened {
            self.pending_events.push(VotingEvent::RevealOpened {
                case: case_id,
                reveal_deadline,
            });
        }
        Ok(CommitReceipt { reveal_opened })
    }

    /// Open the reveal phase once the commit deadline has passed without
    /// every member committing. Anyone may call this.
    pub fn close_commit_phase(
        &mut self,
        case_id: CaseId,
        now: Timestamp,
    ) -> Result<Timestamp, VotingError> {
        let reveal_window = self.params.reveal_window_secs;
        let panel = self.panel_mut(case_id)?;
        expect_phase(panel, VotingPhase::Commit)?;
        if now < panel.commit_deadline {
            return Err(VotingError::CommitDeadlineNotReached(panel.commit_deadline));
        }
        let committed = panel.commit_count();
        let reveal_deadline = open_reveal(panel, now, reveal_window);
        tracing::info!(case = %case_id, committed, "commit phase closed by deadline");
        self.pending_events.push(VotingEvent::RevealOpened {
            case: case_id,
            reveal_deadline,
        });
        Ok(reveal_deadline)
    }

    /// Reveal a committed vote.
    ///
    /// A rejected reveal leaves the commitment untouched so the member can
    /// retry with the correct preimage before the deadline.
    pub fn reveal_verdict(
        &mut self,
        case_id: CaseId,
        participant: &AccountId,
        verdict: Verdict,
        partial_percent: u8,
        salt: Salt,
        now: Timestamp,
    ) -> Result<RevealReceipt, VotingError> {
        let panel = self.panel_mut(case_id)?;
        expect_phase(panel, VotingPhase::Reveal)?;
        if now >= panel.reveal_deadline {
            return Err(VotingError::RevealDeadlinePassed(panel.reveal_deadline));
        }
        let record = panel
            .records
            .get_mut(participant)
            .ok_or_else(|| VotingError::NotPanelMember(participant.clone()))?;
        let commitment = record
            .commitment
            .ok_or_else(|| VotingError::NotCommitted(participant.clone()))?;
        if record.vote.is_some() {
            return Err(VotingError::AlreadyRevealed(participant.clone()));
        }
        verdict.validate_percent(partial_percent)?;
        if commit_hash(verdict, partial_percent, &salt) != commitment {
            tracing::debug!(case = %case_id, %participant, "reveal rejected: hash mismatch");
            return Err(VotingError::HashMismatch);
        }
        let vote = RevealedVote {
            participant: participant.clone(),
            verdict,
            partial_percent,
            salt: Some(salt),
            synthetic: false,
            at: now,
        };
        record.vote = Some(vote.clone());
        let all_revealed = close_if_complete(panel);
        tracing::debug!(case = %case_id, %participant, %verdict, "vote revealed");
        self.pending_events.push(VotingEvent::Revealed {
            case: case_id,
            participant: participant.clone(),
            verdict,
            partial_percent,
        });
        Ok(RevealReceipt { vote, all_revealed })
    }

    /// Record a synthetic `Fail` for a member who committed but missed the
    /// reveal deadline. Anyone may call this once the deadline has passed.
    pub fn penalize_no_reveal(
        &mut self,
        case_id: CaseId,
        participant: &AccountId,
        now: Timestamp,
    ) -> Result<RevealReceipt, VotingError> {
        let panel = self.panel_mut(case_id)?;
        expect_phase(panel, VotingPhase::Reveal)?;
        if now < panel.reveal_deadline {
            return Err(VotingError::RevealDeadlineNotReached(panel.reveal_deadline));
        }
        let record = panel
            .records
            .get_mut(participant)
            .ok_or_else(|| VotingError::NotPanelMember(participant.clone()))?;
        if record.commitment.is_none() {
            return Err(VotingError::NotCommitted(participant.clone()));
        }
        if record.vote.is_some() {
            return Err(VotingError::AlreadyRevealed(participant.clone()));
        }
        let vote = RevealedVote {
            participant: participant.clone(),
            verdict: Verdict::Fail,
            partial_percent: 0,
            salt: None,
            synthetic: true,
            at: now,
        };
        record.vote = Some(vote.clone());
        let all_revealed = close_if_complete(panel);
        tracing::warn!(case = %case_id, %participant, "no-reveal penalized with synthetic fail");
        self.pending_events.push(VotingEvent::NoRevealPenalized {
            case: case_id,
            participant: participant.clone(),
        });
        Ok(RevealReceipt { vote, all_revealed })
    }

    /// Mark a panel closed once its case has settled or escalated.
    pub fn close_panel(&mut self, case_id: CaseId) -> Result<(), VotingError> {
        let panel = self.panel_mut(case_id)?;
        panel.phase = VotingPhase::Closed;
        Ok(())
    }

    pub fn panel(&self, case_id: CaseId) -> Result<&Panel, VotingError> {
        self.panels.get(&case_id).ok_or(VotingError::NoPanel(case_id))
    }

    /// Recorded votes for a case, in seating order.
    pub fn votes(&self, case_id: CaseId) -> Result<Vec<RevealedVote>, VotingError> {
        Ok(self.panel(case_id)?.votes())
    }

    /// Drain events accumulated since the last call.
    pub fn drain_events(&mut self) -> Vec<VotingEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn panel_mut(&mut self, case_id: CaseId) -> Result<&mut Panel, VotingError> {
        self.panels
            .get_mut(&case_id)
            .ok_or(VotingError::NoPanel(case_id))
    }
}

fn expect_phase(panel: &Panel, expected: VotingPhase) -> Result<(), VotingError> {
    if panel.phase != expected {
        return Err(VotingError::WrongPhase {
            case: panel.case_id,
            expected,
            actual: panel.phase,
        });
    }
    Ok(())
}

fn open_reveal(panel: &mut Panel, now: Timestamp, reveal_window: u64) -> Timestamp {
    panel.phase = VotingPhase::Reveal;
    panel.reveal_deadline = now.plus(reveal_window);
    panel.reveal_deadline
}

fn close_if_complete(panel: &mut Panel) -> bool {
    let complete = panel.all_revealed();
    if complete {
        panel.phase = VotingPhase::Closed;
    }
    complete
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 24 * 3600;

    fn judge(i: usize) -> AccountId {
        AccountId::new(format!("judge_{i}"))
    }

    fn salt(i: usize) -> Salt {
        [i as u8 + 1; 32]
    }

    fn open(voting: &mut CommitRevealVoting, size: usize) -> CaseId {
        let case = CaseId::new(1);
        let members = (0..size).map(judge).collect();
        voting
            .open_panel(case, PanelRound::Standard, members, Timestamp::new(0))
            .unwrap();
        case
    }

    fn commit_all(voting: &mut CommitRevealVoting, case: CaseId, verdicts: &[Verdict]) {
        for (i, v) in verdicts.iter().enumerate() {
            voting
                .submit_commit(case, &judge(i), commit_hash(*v, 0, &salt(i)), Timestamp::new(10))
                .unwrap();
        }
    }

    #[test]
    fn last_commit_opens_reveal() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 3);
        let first = voting
            .submit_commit(case, &judge(0), commit_hash(Verdict::Pass, 0, &salt(0)), Timestamp::new(5))
            .unwrap();
        assert_eq!(first.reveal_opened, None);
        voting
            .submit_commit(case, &judge(1), commit_hash(Verdict::Pass, 0, &salt(1)), Timestamp::new(6))
            .unwrap();
        let last = voting
            .submit_commit(case, &judge(2), commit_hash(Verdict::Fail, 0, &salt(2)), Timestamp::new(7))
            .unwrap();
        assert_eq!(last.reveal_opened, Some(Timestamp::new(7 + DAY)));
        assert_eq!(voting.panel(case).unwrap().phase, VotingPhase::Reveal);
    }

    #[test]
    fn commit_rules() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 3);
        let h = commit_hash(Verdict::Pass, 0, &salt(0));

        let err = voting
            .submit_commit(case, &AccountId::new("outsider"), h, Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err.code(), "voting_not_panel_member");

        voting.submit_commit(case, &judge(0), h, Timestamp::new(1)).unwrap();
        let err = voting.submit_commit(case, &judge(0), h, Timestamp::new(2)).unwrap_err();
        assert_eq!(err.code(), "voting_already_committed");

        let err = voting.submit_commit(case, &judge(1), h, Timestamp::new(2)).unwrap_err();
        assert_eq!(err, VotingError::CommitmentReused);

        let err = voting
            .submit_commit(case, &judge(1), commit_hash(Verdict::Fail, 0, &salt(1)), Timestamp::new(DAY))
            .unwrap_err();
        assert_eq!(err.code(), "voting_commit_deadline_passed");
    }

    #[test]
    fn reveal_requires_reveal_phase() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 2);
        voting
            .submit_commit(case, &judge(0), commit_hash(Verdict::Pass, 0, &salt(0)), Timestamp::new(1))
            .unwrap();
        let err = voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(0), Timestamp::new(2))
            .unwrap_err();
        assert_eq!(err.code(), "voting_wrong_phase");
    }

    #[test]
    fn mismatched_reveal_keeps_commitment_for_retry() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 2);
        commit_all(&mut voting, case, &[Verdict::Pass, Verdict::Pass]);

        let err = voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(9), Timestamp::new(20))
            .unwrap_err();
        assert_eq!(err, VotingError::HashMismatch);
        assert!(voting.panel(case).unwrap().records[&judge(0)].commitment.is_some());

        let receipt = voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(0), Timestamp::new(21))
            .unwrap();
        assert!(!receipt.all_revealed);
        let err = voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(0), Timestamp::new(22))
            .unwrap_err();
        assert_eq!(err.code(), "voting_already_revealed");
    }

    #[test]
    fn last_reveal_closes_panel() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 2);
        commit_all(&mut voting, case, &[Verdict::Pass, Verdict::Fail]);
        voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(0), Timestamp::new(20))
            .unwrap();
        let receipt = voting
            .reveal_verdict(case, &judge(1), Verdict::Fail, 0, salt(1), Timestamp::new(21))
            .unwrap();
        assert!(receipt.all_revealed);
        assert_eq!(voting.panel(case).unwrap().phase, VotingPhase::Closed);
        assert_eq!(voting.votes(case).unwrap().len(), 2);
    }

    #[test]
    fn malformed_partial_rejected_before_hash_check() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 1);
        voting
            .submit_commit(case, &judge(0), commit_hash(Verdict::Partial, 100, &salt(0)), Timestamp::new(1))
            .unwrap();
        let err = voting
            .reveal_verdict(case, &judge(0), Verdict::Partial, 100, salt(0), Timestamp::new(2))
            .unwrap_err();
        assert_eq!(err.code(), "voting_invalid_verdict");
    }

    #[test]
    fn no_reveal_penalty_only_after_deadline() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 2);
        commit_all(&mut voting, case, &[Verdict::Pass, Verdict::Pass]);
        voting
            .reveal_verdict(case, &judge(0), Verdict::Pass, 0, salt(0), Timestamp::new(20))
            .unwrap();

        let deadline = voting.panel(case).unwrap().reveal_deadline;
        let err = voting
            .penalize_no_reveal(case, &judge(1), Timestamp::new(deadline.as_secs() - 1))
            .unwrap_err();
        assert_eq!(err.code(), "voting_reveal_deadline_not_reached");

        let err = voting
            .reveal_verdict(case, &judge(1), Verdict::Pass, 0, salt(1), deadline)
            .unwrap_err();
        assert_eq!(err.code(), "voting_reveal_deadline_passed");

        let receipt = voting.penalize_no_reveal(case, &judge(1), deadline).unwrap();
        assert!(receipt.vote.synthetic);
        assert_eq!(receipt.vote.verdict, Verdict::Fail);
        assert!(receipt.all_revealed);
    }

    #[test]
    fn commit_deadline_opens_reveal_for_partial_panel() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let case = open(&mut voting, 3);
        voting
            .submit_commit(case, &judge(0), commit_hash(Verdict::Pass, 0, &salt(0)), Timestamp::new(1))
            .unwrap();
        let err = voting.close_commit_phase(case, Timestamp::new(DAY - 1)).unwrap_err();
        assert_eq!(err.code(), "voting_commit_deadline_not_reached");

        let reveal_deadline = voting.close_commit_phase(case, Timestamp::new(DAY)).unwrap();
        assert_eq!(reveal_deadline, Timestamp::new(2 * DAY));
        // Non-committers cannot be penalized; they have no vote at all.
        let err = voting
            .penalize_no_reveal(case, &judge(2), reveal_deadline)
            .unwrap_err();
        assert_eq!(err.code(), "voting_not_committed");
    }

    #[test]
    fn duplicate_members_rejected() {
        let mut voting = CommitRevealVoting::new(ProtocolParams::default());
        let err = voting
            .open_panel(CaseId::new(3), PanelRound::Standard, vec![judge(0), judge(0)], Timestamp::new(0))
            .unwrap_err();
        assert_eq!(err.code(), "voting_invalid_membership");
    }
}

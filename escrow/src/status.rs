//! The case state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use tribunal_types::{Outcome, PanelRound};

/// Lifecycle state of a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    /// Funded, waiting for a submission. The only cancellable state.
    Pending,
    /// Work attached, waiting for a panel.
    Submitted,
    /// Panel seated, commit phase open.
    Judging { round: PanelRound },
    /// Reveal phase open; revealed verdicts are being recorded.
    Reveal { round: PanelRound },
    /// The round ended without a supermajority.
    Disputed { round: PanelRound },
    /// Funds settled.
    Completed { outcome: Outcome },
    /// Refunded before any work was submitted.
    Cancelled,
}

/// Every state change a case can undergo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    SubmitWork,
    AssignPanel,
    OpenReveal,
    /// Tally reached a supermajority.
    Settle(Outcome),
    /// Tally failed to reach a supermajority.
    Dispute,
    /// Widen a disputed standard panel.
    Escalate,
    /// External arbitrator ruled on a dispute.
    Arbitrate(Outcome),
    Cancel,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::SubmitWork => "submit_work",
            Transition::AssignPanel => "assign_panel",
            Transition::OpenReveal => "open_reveal",
            Transition::Settle(_) => "settle",
            Transition::Dispute => "dispute",
            Transition::Escalate => "escalate",
            Transition::Arbitrate(_) => "arbitrate",
            Transition::Cancel => "cancel",
        }
    }
}

impl CaseStatus {
    /// The state reached by applying `transition`, or `None` if the
    /// transition is not legal from this state.
    pub fn apply(self, transition: Transition) -> Option<CaseStatus> {
        use CaseStatus::*;
        use Transition::*;
        let next = match (self, transition) {
            (Pending, SubmitWork) => Submitted,
            (Pending, Cancel) => Cancelled,
            (Submitted, AssignPanel) => Judging {
                round: PanelRound::Standard,
            },
            (Judging { round }, OpenReveal) => Reveal { round },
            (Reveal { .. }, Settle(outcome)) => Completed { outcome },
            (Reveal { round }, Dispute) => Disputed { round },
            (
                Disputed {
                    round: PanelRound::Standard,
                },
                Escalate,
            ) => Judging {
                round: PanelRound::Expanded,
            },
            (Disputed { .. }, Arbitrate(outcome)) => Completed { outcome },
            _ => return None,
        };
        debug_assert!(next == Cancelled || next.rank() > self.rank());
        Some(next)
    }

    /// Position along the lifecycle. Every legal transition except
    /// cancellation strictly increases it.
    pub fn rank(&self) -> u8 {
        let round_offset = |round: &PanelRound| match round {
            PanelRound::Standard => 0,
            PanelRound::Expanded => 3,
        };
        match self {
            CaseStatus::Pending => 0,
            CaseStatus::Submitted => 1,
            CaseStatus::Judging { round } => 2 + round_offset(round),
            CaseStatus::Reveal { round } => 3 + round_offset(round),
            CaseStatus::Disputed { round } => 4 + round_offset(round),
            CaseStatus::Completed { .. } => 8,
            CaseStatus::Cancelled => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Submitted => "submitted",
            CaseStatus::Judging { .. } => "judging",
            CaseStatus::Reveal { .. } => "reveal",
            CaseStatus::Disputed { .. } => "disputed",
            CaseStatus::Completed { .. } => "completed",
            CaseStatus::Cancelled => "cancelled",
        }
    }

    /// The round currently adjudicating, if a panel has been seated.
    pub fn round(&self) -> Option<PanelRound> {
        match self {
            CaseStatus::Judging { round }
            | CaseStatus::Reveal { round }
            | CaseStatus::Disputed { round } => Some(*round),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Completed { .. } | CaseStatus::Cancelled)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStatus::Judging { round }
            | CaseStatus::Reveal { round }
            | CaseStatus::Disputed { round } => write!(f, "{}({round})", self.name()),
            CaseStatus::Completed { outcome } => write!(f, "completed({outcome})"),
            other => f.write_str(other.name()),
        }
    }
}

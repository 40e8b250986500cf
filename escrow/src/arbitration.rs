//! Who may rule on a dispute.

use crate::case::Case;
use std::collections::BTreeSet;
use tribunal_types::AccountId;

/// Decides whether a caller may resolve a dispute.
///
/// The escrow only asks this question; swapping the policy never changes
/// how a ruling is settled.
pub trait ArbitrationPolicy: Send + Sync {
    fn is_authorized(&self, caller: &AccountId, case: &Case) -> bool;

    fn name(&self) -> &str;
}

/// A single trusted arbitrator.
#[derive(Clone, Debug)]
pub struct SingleArbitrator {
    arbitrator: AccountId,
}

impl SingleArbitrator {
    pub fn new(arbitrator: AccountId) -> Self {
        Self { arbitrator }
    }

    pub fn arbitrator(&self) -> &AccountId {
        &self.arbitrator
    }
}

impl ArbitrationPolicy for SingleArbitrator {
    fn is_authorized(&self, caller: &AccountId, _case: &Case) -> bool {
        caller == &self.arbitrator
    }

    fn name(&self) -> &str {
        "single-arbitrator"
    }
}

/// Any member of a fixed committee may rule, provided they are not a
/// party to the case.
#[derive(Clone, Debug)]
pub struct ArbitrationCommittee {
    members: BTreeSet<AccountId>,
}

impl ArbitrationCommittee {
    pub fn new(members: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &AccountId> {
        self.members.iter()
    }
}

impl ArbitrationPolicy for ArbitrationCommittee {
    fn is_authorized(&self, caller: &AccountId, case: &Case) -> bool {
        self.members.contains(caller) && !case.is_party(caller)
    }

    fn name(&self) -> &str {
        "arbitration-committee"
    }
}

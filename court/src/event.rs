//! The combined audit trail.

use serde::{Deserialize, Serialize};
use tribunal_escrow::CaseEvent;
use tribunal_registry::RegistryEvent;
use tribunal_voting::VotingEvent;

/// An event from any component, in the order the court observed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", content = "event", rename_all = "snake_case")]
pub enum CourtEvent {
    Registry(RegistryEvent),
    Voting(VotingEvent),
    Case(CaseEvent),
}

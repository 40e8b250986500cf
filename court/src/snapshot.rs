//! Whole-court snapshots.
//!
//! A snapshot captures every piece of protocol state: participants, pair
//! history, panels and cases. External collaborators (randomness, funds,
//! arbitration policy) are not part of it and are supplied again on restore.

use crate::CourtError;
use serde::{Deserialize, Serialize};
use tribunal_escrow::EscrowSettlement;
use tribunal_panel::PairHistory;
use tribunal_registry::StakeRegistry;
use tribunal_voting::CommitRevealVoting;

/// Bumped whenever the encoded layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourtSnapshot {
    pub version: u32,
    pub registry: StakeRegistry,
    pub history: PairHistory,
    pub voting: CommitRevealVoting,
    pub escrow: EscrowSettlement,
}

impl CourtSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, CourtError> {
        bincode::serialize(self).map_err(|e| CourtError::Snapshot(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CourtError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| CourtError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CourtError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

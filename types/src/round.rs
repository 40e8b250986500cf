//! Adjudication rounds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which panel is adjudicating a case.
///
/// A case starts with a standard panel; a disputed standard round may be
/// escalated once to an expanded panel containing every prior member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PanelRound {
    Standard,
    Expanded,
}

impl PanelRound {
    pub fn as_byte(&self) -> u8 {
        match self {
            PanelRound::Standard => 0,
            PanelRound::Expanded => 1,
        }
    }

    /// Panel size for this round.
    pub fn panel_size(&self, params: &crate::ProtocolParams) -> usize {
        match self {
            PanelRound::Standard => params.panel_size as usize,
            PanelRound::Expanded => params.expanded_panel_size as usize,
        }
    }

    /// Votes for one verdict needed to settle without dispute.
    pub fn supermajority(&self, params: &crate::ProtocolParams) -> usize {
        match self {
            PanelRound::Standard => params.supermajority as usize,
            PanelRound::Expanded => params.expanded_supermajority as usize,
        }
    }
}

impl fmt::Display for PanelRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelRound::Standard => f.write_str("standard"),
            PanelRound::Expanded => f.write_str("expanded"),
        }
    }
}

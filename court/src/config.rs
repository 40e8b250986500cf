//! Court configuration with TOML file support.

use crate::CourtError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tribunal_escrow::{ArbitrationCommittee, ArbitrationPolicy, SingleArbitrator};
use tribunal_types::{AccountId, ProtocolParams};

/// Configuration for a court deployment.
///
/// Loaded from TOML via [`CourtConfig::from_toml_file`] or built in code.
/// Missing keys fall back to defaults, including every protocol parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtConfig {
    /// Account allowed to adjust owner-controlled settings.
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    /// Account credited with fees, deductions and slashed stake.
    #[serde(default = "default_treasury")]
    pub treasury: AccountId,

    /// Dispute arbitrators. One entry selects a single arbitrator; more
    /// form a committee where any member may rule.
    #[serde(default = "default_arbitrators")]
    pub arbitrators: Vec<AccountId>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,tribunal_court=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub params: ProtocolParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_owner() -> AccountId {
    AccountId::new("owner")
}

fn default_treasury() -> AccountId {
    AccountId::new("treasury")
}

fn default_arbitrators() -> Vec<AccountId> {
    vec![AccountId::new("arbitrator")]
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CourtConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CourtError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CourtError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CourtError> {
        toml::from_str(s).map_err(|e| CourtError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, CourtError> {
        toml::to_string_pretty(self).map_err(|e| CourtError::Config(e.to_string()))
    }

    /// Check the parameters and arbitrator list.
    pub fn validate(&self) -> Result<(), CourtError> {
        self.params.validate()?;
        if self.arbitrators.is_empty() {
            return Err(CourtError::Config("at least one arbitrator is required".into()));
        }
        Ok(())
    }

    /// The arbitration policy the arbitrator list describes.
    pub fn arbitration_policy(&self) -> Box<dyn ArbitrationPolicy> {
        match self.arbitrators.as_slice() {
            [single] => Box::new(SingleArbitrator::new(single.clone())),
            many => Box::new(ArbitrationCommittee::new(many.iter().cloned())),
        }
    }
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            treasury: default_treasury(),
            arbitrators: default_arbitrators(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: ProtocolParams::default(),
        }
    }
}

//! Judge verdicts and settled outcomes.

use crate::error::TribunalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A judge's verdict on a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The submission meets the requirements; the worker is paid in full.
    Pass,
    /// The submission does not meet the requirements; the poster is refunded.
    Fail,
    /// The submission partially meets the requirements; funds are split.
    Partial,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Pass, Verdict::Fail, Verdict::Partial];

    /// Byte tag used inside commitment preimages. Never reorder.
    pub fn as_byte(&self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
            Verdict::Partial => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Partial => "partial",
        }
    }

    /// Check that `percent` is acceptable alongside this verdict.
    ///
    /// Every verdict accepts a percentage in `[0, 100]` (it is part of the
    /// sealed preimage), but a `Partial` verdict must lie strictly between
    /// 0 and 100: the endpoints are a pass or fail in disguise.
    pub fn validate_percent(&self, percent: u8) -> Result<(), TribunalError> {
        let ok = match self {
            Verdict::Partial => (1..=99).contains(&percent),
            Verdict::Pass | Verdict::Fail => percent <= 100,
        };
        if ok {
            Ok(())
        } else {
            Err(TribunalError::InvalidPercentage {
                verdict: self.as_str().to_string(),
                percent,
            })
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = TribunalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(Verdict::Pass),
            "fail" => Ok(Verdict::Fail),
            "partial" => Ok(Verdict::Partial),
            other => Err(TribunalError::InvalidVerdict(other.to_string())),
        }
    }
}

/// The resolved outcome of a case: a verdict plus, for partial verdicts,
/// the worker's share in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    /// Worker share for `Partial`; always 0 for `Pass` and `Fail`.
    pub partial_percent: u8,
}

impl Outcome {
    /// Build a validated outcome. Non-partial verdicts drop the percentage.
    pub fn new(verdict: Verdict, partial_percent: u8) -> Result<Self, TribunalError> {
        verdict.validate_percent(partial_percent)?;
        let partial_percent = match verdict {
            Verdict::Partial => partial_percent,
            Verdict::Pass | Verdict::Fail => 0,
        };
        Ok(Self {
            verdict,
            partial_percent,
        })
    }

    pub fn pass() -> Self {
        Self {
            verdict: Verdict::Pass,
            partial_percent: 0,
        }
    }

    pub fn fail() -> Self {
        Self {
            verdict: Verdict::Fail,
            partial_percent: 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Partial => write!(f, "partial({}%)", self.partial_percent),
            v => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_endpoints_are_rejected() {
        assert!(Outcome::new(Verdict::Partial, 0).is_err());
        assert!(Outcome::new(Verdict::Partial, 100).is_err());
        assert!(Outcome::new(Verdict::Partial, 1).is_ok());
        assert!(Outcome::new(Verdict::Partial, 99).is_ok());
    }

    #[test]
    fn pass_and_fail_drop_percentage() {
        let o = Outcome::new(Verdict::Pass, 70).unwrap();
        assert_eq!(o.partial_percent, 0);
        assert!(Outcome::new(Verdict::Fail, 101).is_err());
    }

    #[test]
    fn verdict_parses_case_insensitively() {
        assert_eq!("PASS".parse::<Verdict>().unwrap(), Verdict::Pass);
        assert_eq!("partial".parse::<Verdict>().unwrap(), Verdict::Partial);
        assert_eq!(
            "maybe".parse::<Verdict>().unwrap_err().code(),
            "invalid_verdict"
        );
    }

    #[test]
    fn byte_tags_are_distinct() {
        let mut tags: Vec<u8> = Verdict::ALL.iter().map(|v| v.as_byte()).collect();
        tags.dedup();
        assert_eq!(tags.len(), 3);
    }
}

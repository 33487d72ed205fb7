//! Risk levels and the weighting policy used to aggregate them

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal severity of a rule or an event.
///
/// Variant order is the severity order: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(CoreError::InvalidValue(format!(
                "unknown risk level '{}'",
                other
            ))),
        }
    }
}

/// Score contributed by one triggered rule at each level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            low: 1,
            medium: 5,
            high: 10,
        }
    }
}

/// Aggregation policy for triggered rules.
///
/// Weights must be strictly increasing with severity so that the score
/// never disagrees with the level ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RiskPolicy {
    weights: RiskWeights,
}

impl RiskPolicy {
    /// Create a policy, rejecting non-monotonic weight tables
    pub fn new(weights: RiskWeights) -> Result<Self> {
        if !(weights.low < weights.medium && weights.medium < weights.high) {
            return Err(CoreError::InvalidPolicy(format!(
                "weights must satisfy low < medium < high, got {}/{}/{}",
                weights.low, weights.medium, weights.high
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> RiskWeights {
        self.weights
    }

    pub fn weight(&self, level: RiskLevel) -> u32 {
        match level {
            RiskLevel::Low => self.weights.low,
            RiskLevel::Medium => self.weights.medium,
            RiskLevel::High => self.weights.high,
        }
    }

    /// Returns `(max level, summed score)` for the given triggered levels.
    /// An empty input yields `(None, 0)`.
    pub fn aggregate<I>(&self, levels: I) -> (Option<RiskLevel>, u32)
    where
        I: IntoIterator<Item = RiskLevel>,
    {
        levels
            .into_iter()
            .fold((None, 0u32), |(max, score), level| {
                (max.max(Some(level)), score.saturating_add(self.weight(level)))
            })
    }
}

impl<'de> Deserialize<'de> for RiskPolicy {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            weights: RiskWeights,
        }

        let raw = Raw::deserialize(deserializer)?;
        RiskPolicy::new(raw.weights).map_err(serde::de::Error::custom)
    }
}

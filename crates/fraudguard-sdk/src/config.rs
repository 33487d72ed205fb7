//! Detector configuration
//!
//! ```yaml
//! # config/fraud.yaml
//! risk_weights: { low: 1, medium: 5, high: 10 }
//! persistence:
//!   record_empty: false
//! rule_timeout_ms: 2000
//! lookup_timeout_ms: 500
//! disposable_list_key: disposableEmailDomains
//! repository:
//!   source: file_system
//!   base_path: repository
//! lists_file: config/lists.yaml
//! ```

use fraudguard_core::{RiskPolicy, RiskWeights};
use fraudguard_repository::RepositoryConfig;
use fraudguard_runtime::DISPOSABLE_EMAIL_DOMAINS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// What gets written after an evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Also record evaluations where no rule triggered
    #[serde(default)]
    pub record_empty: bool,
}

/// Fraud detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Score per triggered rule at each risk level
    #[serde(default)]
    pub risk_weights: RiskWeights,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Budget for a single rule evaluation
    #[serde(default = "default_rule_timeout_ms")]
    pub rule_timeout_ms: u64,

    /// Budget for a single external lookup inside a rule
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// List id of the disposable email domain set
    #[serde(default = "default_disposable_list_key")]
    pub disposable_list_key: String,

    /// Where overrides, events and enrollments live
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Optional YAML list configuration
    #[serde(default)]
    pub lists_file: Option<PathBuf>,
}

fn default_rule_timeout_ms() -> u64 {
    2000
}

fn default_lookup_timeout_ms() -> u64 {
    500
}

fn default_disposable_list_key() -> String {
    DISPOSABLE_EMAIL_DOMAINS.to_string()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            risk_weights: RiskWeights::default(),
            persistence: PersistenceConfig::default(),
            rule_timeout_ms: default_rule_timeout_ms(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            disposable_list_key: default_disposable_list_key(),
            repository: RepositoryConfig::default(),
            lists_file: None,
        }
    }
}

impl DetectorConfig {
    /// Load from `config/fraud.{yaml,toml,json}` and `FRAUDGUARD__*` variables
    ///
    /// A `.env` file is read first when present. Nested keys use a double
    /// underscore, e.g. `FRAUDGUARD__PERSISTENCE__RECORD_EMPTY=true`.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/fraud").required(false))
            .add_source(
                config::Environment::with_prefix("FRAUDGUARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build();

        let config: Self = match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))?,
            Err(e) => {
                tracing::info!("No usable config source ({}), using default configuration", e);
                Self::default()
            }
        };

        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid fraud detector config: {}", e))?;
        Ok(config)
    }

    pub fn with_risk_weights(mut self, weights: RiskWeights) -> Self {
        self.risk_weights = weights;
        self
    }

    pub fn with_record_empty(mut self, record_empty: bool) -> Self {
        self.persistence.record_empty = record_empty;
        self
    }

    pub fn with_rule_timeout(mut self, timeout: Duration) -> Self {
        self.rule_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_lists_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lists_file = Some(path.into());
        self
    }

    pub fn risk_policy(&self) -> Result<RiskPolicy> {
        Ok(RiskPolicy::new(self.risk_weights)?)
    }

    pub fn rule_timeout(&self) -> Duration {
        Duration::from_millis(self.rule_timeout_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Check weights, timeouts and repository settings
    pub fn validate(&self) -> Result<()> {
        self.risk_policy()?;
        if self.rule_timeout_ms == 0 || self.lookup_timeout_ms == 0 {
            return Err(crate::SdkError::ConfigError(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.disposable_list_key.trim().is_empty() {
            return Err(crate::SdkError::ConfigError(
                "disposable_list_key must not be empty".to_string(),
            ));
        }
        self.repository
            .validate()
            .map_err(|e| crate::SdkError::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.rule_timeout(), Duration::from_secs(2));
        assert_eq!(config.lookup_timeout(), Duration::from_millis(500));
        assert_eq!(config.disposable_list_key, "disposableEmailDomains");
        assert!(!config.persistence.record_empty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: DetectorConfig = serde_json::from_str(
            r#"{"risk_weights": {"low": 2, "medium": 4, "high": 8}, "persistence": {"record_empty": true}}"#,
        )
        .unwrap();
        assert_eq!(config.risk_policy().unwrap().weight(fraudguard_core::RiskLevel::High), 8);
        assert!(config.persistence.record_empty);
        assert_eq!(config.rule_timeout_ms, 2000);
    }

    #[test]
    fn test_rejects_non_monotonic_weights() {
        let config = DetectorConfig::default().with_risk_weights(RiskWeights {
            low: 5,
            medium: 5,
            high: 10,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = DetectorConfig::default()
            .with_rule_timeout(Duration::MAX)
            .with_lookup_timeout(Duration::from_millis(750));
        assert_eq!(config.rule_timeout_ms, u64::MAX);
        assert_eq!(config.lookup_timeout_ms, 750);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = DetectorConfig::default().with_rule_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}

//! Persisted records: program rule overrides and fraud events

use super::risk::RiskLevel;
use super::rule_type::FraudRuleType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-program customization of one catalog rule.
///
/// At most one override exists per `(program_id, rule_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudRuleOverride {
    pub id: String,
    pub program_id: String,
    pub rule_type: FraudRuleType,
    pub risk_level: RiskLevel,
    /// `None` falls back to the catalog default config
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    /// Non-null disables the rule for the program
    #[serde(default)]
    pub disabled_at: Option<DateTime<Utc>>,
}

impl FraudRuleOverride {
    pub fn new(
        id: impl Into<String>,
        program_id: impl Into<String>,
        rule_type: FraudRuleType,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            id: id.into(),
            program_id: program_id.into(),
            rule_type,
            risk_level,
            config: None,
            disabled_at: None,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    pub fn disabled(mut self, at: DateTime<Utc>) -> Self {
        self.disabled_at = Some(at);
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_at.is_some()
    }
}

/// One rule that fired during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredRule {
    pub rule_type: FraudRuleType,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Fraud event about to be inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFraudEvent {
    pub program_id: String,
    pub partner_id: String,
    pub customer_id: Option<String>,
    pub link_id: Option<String>,
    pub commission_id: Option<String>,
    pub event_id: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub risk_score: u32,
    pub triggered_rules: Vec<TriggeredRule>,
}

/// Stored fraud event. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudEvent {
    pub id: String,
    pub program_id: String,
    pub partner_id: String,
    pub customer_id: Option<String>,
    pub link_id: Option<String>,
    pub commission_id: Option<String>,
    pub event_id: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub risk_score: u32,
    pub triggered_rules: Vec<TriggeredRule>,
    pub created_at: DateTime<Utc>,
}

impl FraudEvent {
    pub fn from_new(id: impl Into<String>, created_at: DateTime<Utc>, record: NewFraudEvent) -> Self {
        Self {
            id: id.into(),
            program_id: record.program_id,
            partner_id: record.partner_id,
            customer_id: record.customer_id,
            link_id: record.link_id,
            commission_id: record.commission_id,
            event_id: record.event_id,
            risk_level: record.risk_level,
            risk_score: record.risk_score,
            triggered_rules: record.triggered_rules,
            created_at,
        }
    }

    pub fn has_triggered(&self, rule_type: FraudRuleType) -> bool {
        self.triggered_rules.iter().any(|r| r.rule_type == rule_type)
    }
}

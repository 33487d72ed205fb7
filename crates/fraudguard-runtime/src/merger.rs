//! Rule Merger
//!
//! Combines the catalog defaults with one program's overrides.

use crate::registry::RuleRegistry;
use fraudguard_core::{FraudRuleOverride, FraudRuleType, RiskLevel, RuleScope};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Effective configuration of one catalog rule for one program
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRule {
    /// Override id, when the program customized this rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: FraudRuleType,
    pub name: String,
    pub description: String,
    pub scope: RuleScope,
    pub risk_level: RiskLevel,
    pub config: Option<Value>,
    pub enabled: bool,
}

/// Merge `overrides` for `program_id` onto every defined catalog rule.
///
/// One entry per defined rule, in catalog order. Overrides that belong to
/// another program or to a reserved/unknown type are ignored.
pub fn merge_rules(
    program_id: &str,
    overrides: &[FraudRuleOverride],
    registry: &RuleRegistry,
) -> Vec<MergedRule> {
    let by_type: HashMap<FraudRuleType, &FraudRuleOverride> = overrides
        .iter()
        .filter(|o| o.program_id == program_id)
        .map(|o| (o.rule_type, o))
        .collect();

    registry
        .list()
        .iter()
        .map(|rule| {
            let meta = rule.metadata();
            let base = MergedRule {
                id: None,
                rule_type: meta.rule_type,
                name: meta.name.to_string(),
                description: meta.description.to_string(),
                scope: meta.scope,
                risk_level: meta.default_risk_level,
                config: rule.default_config(),
                enabled: true,
            };

            match by_type.get(&meta.rule_type) {
                Some(o) => MergedRule {
                    id: Some(o.id.clone()),
                    risk_level: o.risk_level,
                    config: match &o.config {
                        Some(config) if !config.is_null() => Some(config.clone()),
                        _ => base.config.clone(),
                    },
                    enabled: o.disabled_at.is_none(),
                    ..base
                },
                None => base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_no_overrides_yields_defaults() {
        let registry = RuleRegistry::builtin();
        let merged = merge_rules("prog_1", &[], &registry);

        assert_eq!(merged.len(), registry.len());
        assert!(merged.iter().all(|r| r.enabled && r.id.is_none()));
        let self_referral = &merged[0];
        assert_eq!(self_referral.rule_type, FraudRuleType::SelfReferral);
        assert_eq!(self_referral.risk_level, RiskLevel::High);
        assert_eq!(
            self_referral.config.as_ref().and_then(|c| c.get("similarityThreshold")),
            Some(&json!(0.8))
        );
    }

    #[test]
    fn test_override_risk_level_and_disable() {
        let registry = RuleRegistry::builtin();
        let overrides = vec![
            FraudRuleOverride::new(
                "fr_1",
                "prog_1",
                FraudRuleType::PartnerNoSocialLinks,
                RiskLevel::High,
            ),
            FraudRuleOverride::new("fr_2", "prog_1", FraudRuleType::PaidAdTraffic, RiskLevel::Low)
                .disabled(Utc::now()),
        ];

        let merged = merge_rules("prog_1", &overrides, &registry);
        let find = |t| merged.iter().find(|r| r.rule_type == t).unwrap();

        let social = find(FraudRuleType::PartnerNoSocialLinks);
        assert_eq!(social.risk_level, RiskLevel::High);
        assert_eq!(social.id.as_deref(), Some("fr_1"));
        assert!(social.enabled);

        let paid = find(FraudRuleType::PaidAdTraffic);
        assert!(!paid.enabled);
        assert_eq!(merged.len(), registry.len());
    }

    #[test]
    fn test_override_config_and_null_fallback() {
        let registry = RuleRegistry::builtin();
        let custom = FraudRuleOverride::new(
            "fr_1",
            "prog_1",
            FraudRuleType::BannedReferralDomain,
            RiskLevel::High,
        )
        .with_config(json!({"domains": ["spam.example"]}));
        let null_config = FraudRuleOverride::new(
            "fr_2",
            "prog_1",
            FraudRuleType::SelfReferral,
            RiskLevel::Medium,
        )
        .with_config(Value::Null);

        let merged = merge_rules("prog_1", &[custom, null_config], &registry);
        let banned = merged
            .iter()
            .find(|r| r.rule_type == FraudRuleType::BannedReferralDomain)
            .unwrap();
        assert_eq!(banned.config, Some(json!({"domains": ["spam.example"]})));

        let self_referral = &merged[0];
        assert_eq!(self_referral.risk_level, RiskLevel::Medium);
        assert!(self_referral.config.as_ref().unwrap().get("checkExactMatch").is_some());
    }

    #[test]
    fn test_other_program_overrides_ignored() {
        let registry = RuleRegistry::builtin();
        let foreign =
            FraudRuleOverride::new("fr_9", "prog_2", FraudRuleType::SelfReferral, RiskLevel::Low);
        let merged = merge_rules("prog_1", &[foreign], &registry);
        assert_eq!(merged[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let registry = RuleRegistry::builtin();
        let overrides = vec![
            FraudRuleOverride::new("a", "p", FraudRuleType::PartnerEmailMasked, RiskLevel::High),
            FraudRuleOverride::new("b", "p", FraudRuleType::SelfReferral, RiskLevel::Low),
        ];
        let mut reversed = overrides.clone();
        reversed.reverse();
        assert_eq!(
            merge_rules("p", &overrides, &registry),
            merge_rules("p", &reversed, &registry)
        );
    }
}

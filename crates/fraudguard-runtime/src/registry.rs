//! Rule Registry
//!
//! Read-only mapping from rule type to its definition. Reserved types hold an
//! empty slot: they are part of the catalog but have no definition yet, and
//! are skipped by the merger and rejected by the executor.

use crate::rules::{
    BannedReferralDomain, CustomerEmailSuspiciousDomain, DynRule, PaidAdTraffic,
    PartnerCrossProgramBan, PartnerEmailDomainMismatch, PartnerEmailMasked,
    PartnerEmailSuspiciousDomain, PartnerNoSocialLinks, PartnerNoVerifiedSocialLinks, Placeholder,
    Rule, RuleMetadata, SelfReferral,
};
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use std::sync::{Arc, OnceLock};

type Slot = (FraudRuleType, Option<Arc<dyn DynRule>>);

/// Rule registry
///
/// Slots keep registration order, which is the catalog iteration order.
#[derive(Clone)]
pub struct RuleRegistry {
    slots: Vec<Slot>,
}

static GLOBAL: OnceLock<Arc<RuleRegistry>> = OnceLock::new();

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Every built-in rule, in [`FraudRuleType::ALL`] order
    pub fn builtin() -> Self {
        let mut builder = Self::builder();
        for &rule_type in FraudRuleType::ALL {
            builder = match builtin_rule(rule_type) {
                Some(rule) => builder.register_dyn(rule),
                None => builder.reserve(rule_type),
            };
        }
        builder.build()
    }

    /// Process-wide built-in registry
    pub fn global() -> Arc<RuleRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Definition for `rule_type`; `None` when absent or reserved
    pub fn get(&self, rule_type: FraudRuleType) -> Option<Arc<dyn DynRule>> {
        self.slots
            .iter()
            .find(|(t, _)| *t == rule_type)
            .and_then(|(_, rule)| rule.clone())
    }

    /// All defined rules in catalog order
    pub fn list(&self) -> Vec<Arc<dyn DynRule>> {
        self.slots
            .iter()
            .filter_map(|(_, rule)| rule.clone())
            .collect()
    }

    pub fn has(&self, rule_type: FraudRuleType) -> bool {
        self.get(rule_type).is_some()
    }

    /// Whether `rule_type` holds a reserved, empty slot
    pub fn is_reserved(&self, rule_type: FraudRuleType) -> bool {
        self.slots
            .iter()
            .any(|(t, rule)| *t == rule_type && rule.is_none())
    }

    /// Every slot's type, reserved ones included
    pub fn rule_types(&self) -> Vec<FraudRuleType> {
        self.slots.iter().map(|(t, _)| *t).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|(_, rule)| rule.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.slots
                    .iter()
                    .map(|(t, rule)| (t.as_str(), rule.is_some())),
            )
            .finish()
    }
}

/// Builder for custom registries (tests, staged rollouts)
#[derive(Default)]
pub struct RuleRegistryBuilder {
    slots: Vec<Slot>,
}

impl RuleRegistryBuilder {
    /// Start from the built-in catalog
    pub fn from_builtin() -> Self {
        Self {
            slots: RuleRegistry::builtin().slots,
        }
    }

    pub fn register<R: Rule>(self, rule: R) -> Self {
        self.register_dyn(Arc::new(rule))
    }

    /// Register a rule; a rule of the same type is replaced in place
    pub fn register_dyn(mut self, rule: Arc<dyn DynRule>) -> Self {
        let rule_type = rule.metadata().rule_type;
        self.put(rule_type, Some(rule));
        self
    }

    /// Reserve a catalog slot without a definition
    pub fn reserve(mut self, rule_type: FraudRuleType) -> Self {
        self.put(rule_type, None);
        self
    }

    pub fn build(self) -> RuleRegistry {
        RuleRegistry { slots: self.slots }
    }

    fn put(&mut self, rule_type: FraudRuleType, rule: Option<Arc<dyn DynRule>>) {
        match self.slots.iter_mut().find(|(t, _)| *t == rule_type) {
            Some(slot) => slot.1 = rule,
            None => self.slots.push((rule_type, rule)),
        }
    }
}

fn placeholder(
    rule_type: FraudRuleType,
    name: &'static str,
    description: &'static str,
    scope: RuleScope,
    default_risk_level: RiskLevel,
) -> Arc<dyn DynRule> {
    Arc::new(Placeholder::new(RuleMetadata {
        rule_type,
        name,
        description,
        scope,
        default_risk_level,
    }))
}

fn builtin_rule(rule_type: FraudRuleType) -> Option<Arc<dyn DynRule>> {
    let rule: Arc<dyn DynRule> = match rule_type {
        FraudRuleType::SelfReferral => Arc::new(SelfReferral),
        FraudRuleType::CustomerEmailSuspiciousDomain => Arc::new(CustomerEmailSuspiciousDomain),
        FraudRuleType::BannedReferralDomain => Arc::new(BannedReferralDomain),
        FraudRuleType::PaidAdTraffic => Arc::new(PaidAdTraffic),
        FraudRuleType::CustomerIpSuspicious => placeholder(
            rule_type,
            "Suspicious customer IP",
            "Customer IP is a known proxy, VPN or hosting address",
            RuleScope::ConversionEvent,
            RiskLevel::Medium,
        ),
        FraudRuleType::ReferralSourceBanned => placeholder(
            rule_type,
            "Banned referral source",
            "Conversion was referred from a banned source",
            RuleScope::ConversionEvent,
            RiskLevel::High,
        ),
        FraudRuleType::PaidTrafficDetected => placeholder(
            rule_type,
            "Paid traffic detected",
            "Conversion traffic was bought rather than referred",
            RuleScope::ConversionEvent,
            RiskLevel::Medium,
        ),
        FraudRuleType::PartnerEmailSuspiciousDomain => Arc::new(PartnerEmailSuspiciousDomain),
        FraudRuleType::PartnerEmailMasked => Arc::new(PartnerEmailMasked),
        FraudRuleType::PartnerEmailDomainMismatch => Arc::new(PartnerEmailDomainMismatch),
        FraudRuleType::PartnerNoSocialLinks => Arc::new(PartnerNoSocialLinks),
        FraudRuleType::PartnerNoVerifiedSocialLinks => Arc::new(PartnerNoVerifiedSocialLinks),
        FraudRuleType::PartnerCrossProgramBan => Arc::new(PartnerCrossProgramBan),
        FraudRuleType::PartnerIpSuspicious => placeholder(
            rule_type,
            "Suspicious partner IP",
            "Partner IP is a known proxy, VPN or hosting address",
            RuleScope::Partner,
            RiskLevel::Medium,
        ),
        FraudRuleType::PartnerProgramBanned => placeholder(
            rule_type,
            "Partner banned from program",
            "Partner was previously banned from this program",
            RuleScope::Partner,
            RiskLevel::High,
        ),
        FraudRuleType::CustomerIpVelocity | FraudRuleType::PartnerDuplicatePayoutMethod => {
            return None
        }
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_catalog() {
        let registry = RuleRegistry::builtin();
        assert_eq!(registry.rule_types(), FraudRuleType::ALL.to_vec());
        assert_eq!(registry.len(), FraudRuleType::ALL.len() - 2);

        for rule in registry.list() {
            let meta = rule.metadata();
            assert!(registry.has(meta.rule_type));
            assert!(!meta.name.is_empty());
        }
    }

    #[test]
    fn test_reserved_slots() {
        let registry = RuleRegistry::builtin();
        for rule_type in [
            FraudRuleType::CustomerIpVelocity,
            FraudRuleType::PartnerDuplicatePayoutMethod,
        ] {
            assert!(registry.get(rule_type).is_none());
            assert!(!registry.has(rule_type));
            assert!(registry.is_reserved(rule_type));
        }
        assert!(!registry.is_reserved(FraudRuleType::SelfReferral));
    }

    #[test]
    fn test_list_follows_catalog_order() {
        let types: Vec<_> = RuleRegistry::builtin()
            .list()
            .iter()
            .map(|r| r.metadata().rule_type)
            .collect();
        let expected: Vec<_> = FraudRuleType::ALL
            .iter()
            .copied()
            .filter(|t| {
                !matches!(
                    t,
                    FraudRuleType::CustomerIpVelocity | FraudRuleType::PartnerDuplicatePayoutMethod
                )
            })
            .collect();
        assert_eq!(types, expected);
    }

    #[test]
    fn test_builder_replaces_in_place() {
        let registry = RuleRegistryBuilder::from_builtin()
            .reserve(FraudRuleType::SelfReferral)
            .build();
        assert!(registry.is_reserved(FraudRuleType::SelfReferral));
        assert_eq!(registry.rule_types()[0], FraudRuleType::SelfReferral);
    }

    #[test]
    fn test_global_is_shared() {
        let a = RuleRegistry::global();
        let b = RuleRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

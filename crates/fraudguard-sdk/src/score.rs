//! Aggregation of triggered rules into a risk assessment

use fraudguard_core::{
    FraudEvaluationContext, FraudRuleType, NewFraudEvent, RiskLevel, RiskPolicy, TriggeredRule,
};
use serde::Serialize;

/// Result of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Highest level among triggered rules, `None` when nothing triggered
    pub risk_level: Option<RiskLevel>,
    /// Sum of per-rule weights
    pub risk_score: u32,
    /// Triggered rules in catalog order
    pub triggered_rules: Vec<TriggeredRule>,
    /// Number of enabled rules that were run
    pub evaluated_rules: usize,
    /// Rules that errored or timed out; they count as not triggered
    pub failed_rules: Vec<FraudRuleType>,
}

impl RiskAssessment {
    /// Aggregate `triggered_rules` under `policy`
    pub fn aggregate(
        policy: &RiskPolicy,
        triggered_rules: Vec<TriggeredRule>,
        evaluated_rules: usize,
        failed_rules: Vec<FraudRuleType>,
    ) -> Self {
        let (risk_level, risk_score) = policy.aggregate(triggered_rules.iter().map(|r| r.risk_level));
        Self {
            risk_level,
            risk_score,
            triggered_rules,
            evaluated_rules,
            failed_rules,
        }
    }

    pub fn is_flagged(&self) -> bool {
        !self.triggered_rules.is_empty()
    }

    pub fn has_triggered(&self, rule_type: FraudRuleType) -> bool {
        self.triggered_rules.iter().any(|r| r.rule_type == rule_type)
    }

    /// One record carrying every triggered rule
    pub fn to_event(&self, context: &FraudEvaluationContext) -> NewFraudEvent {
        new_event(
            context,
            self.risk_level,
            self.risk_score,
            self.triggered_rules.clone(),
        )
    }

    /// One record per triggered rule, each scored on its own
    pub fn to_per_rule_events(
        &self,
        context: &FraudEvaluationContext,
        policy: &RiskPolicy,
    ) -> Vec<NewFraudEvent> {
        self.triggered_rules
            .iter()
            .map(|rule| {
                new_event(
                    context,
                    Some(rule.risk_level),
                    policy.weight(rule.risk_level),
                    vec![rule.clone()],
                )
            })
            .collect()
    }
}

fn new_event(
    context: &FraudEvaluationContext,
    risk_level: Option<RiskLevel>,
    risk_score: u32,
    triggered_rules: Vec<TriggeredRule>,
) -> NewFraudEvent {
    NewFraudEvent {
        program_id: context.program.id.clone(),
        partner_id: context.partner.id.clone(),
        customer_id: context.customer.as_ref().map(|c| c.id.clone()),
        link_id: context.link.as_ref().map(|l| l.id.clone()),
        commission_id: context.commission.as_ref().map(|c| c.id.clone()),
        event_id: context.event.as_ref().map(|e| e.id.clone()),
        risk_level,
        risk_score,
        triggered_rules,
    }
}

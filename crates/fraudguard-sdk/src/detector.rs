//! Fraud detector
//!
//! Single-pass pipeline per call:
//!
//! 1. safelisted partners bypass evaluation
//! 2. structural validation of the context
//! 3. load the program's overrides and merge them onto the catalog
//! 4. run every enabled rule of the pipeline's scope concurrently
//! 5. aggregate triggered rules into a risk assessment
//! 6. optionally persist a fraud event
//!
//! None of the entry points return errors. Failures are logged and the call
//! yields `None`, so the caller's own transaction is never blocked.

use crate::builder::FraudDetectorBuilder;
use crate::config::PersistenceConfig;
use crate::score::RiskAssessment;
use fraudguard_core::{FraudEvaluationContext, FraudEvent, RiskPolicy, RuleScope, TriggeredRule};
use fraudguard_repository::{FraudEventRepository, OverrideRepository};
use fraudguard_runtime::{merge_rules, MergedRule, RuleExecutor, RuleOutcome, RuleRegistry};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Evaluates fraud rules for conversions and partner applications
pub struct FraudDetector {
    executor: RuleExecutor,
    overrides: Arc<dyn OverrideRepository>,
    events: Arc<dyn FraudEventRepository>,
    policy: RiskPolicy,
    persistence: PersistenceConfig,
    rule_timeout: Duration,
}

impl FraudDetector {
    pub fn builder() -> FraudDetectorBuilder {
        FraudDetectorBuilder::new()
    }

    pub(crate) fn new(
        executor: RuleExecutor,
        overrides: Arc<dyn OverrideRepository>,
        events: Arc<dyn FraudEventRepository>,
        policy: RiskPolicy,
        persistence: PersistenceConfig,
        rule_timeout: Duration,
    ) -> Self {
        Self {
            executor,
            overrides,
            events,
            policy,
            persistence,
            rule_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        self.executor.registry()
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Evaluate a conversion and record one fraud event for it.
    ///
    /// Returns the stored event, or `None` when the partner is safelisted, the
    /// context is invalid, nothing triggered (unless `record_empty` is set), or
    /// a store call failed.
    pub async fn detect_and_record_fraud(
        &self,
        context: &FraudEvaluationContext,
    ) -> Option<FraudEvent> {
        let assessment = self.evaluate(RuleScope::ConversionEvent, context).await?;
        if !assessment.is_flagged() && !self.persistence.record_empty {
            debug!(
                "No fraud rules triggered for program {} partner {}",
                context.program.id, context.partner.id
            );
            return None;
        }

        match self.events.create_fraud_event(assessment.to_event(context)).await {
            Ok(event) => {
                info!(
                    "Recorded fraud event {} for program {} (level {:?}, score {}, {} rules)",
                    event.id,
                    event.program_id,
                    event.risk_level,
                    event.risk_score,
                    event.triggered_rules.len()
                );
                Some(event)
            }
            Err(e) => {
                error!(
                    "Failed to record fraud event for program {} partner {}: {}",
                    context.program.id, context.partner.id, e
                );
                None
            }
        }
    }

    /// Evaluate a conversion and record one event per triggered rule in a
    /// single batch. Returns how many records were written.
    pub async fn detect_and_record_per_rule(&self, context: &FraudEvaluationContext) -> Option<u64> {
        let assessment = self.evaluate(RuleScope::ConversionEvent, context).await?;
        if !assessment.is_flagged() {
            return None;
        }

        let records = assessment.to_per_rule_events(context, &self.policy);
        match self.events.create_fraud_events(records).await {
            Ok(written) => {
                info!(
                    "Recorded {} fraud events for program {} partner {}",
                    written, context.program.id, context.partner.id
                );
                Some(written)
            }
            Err(e) => {
                error!(
                    "Failed to record fraud events for program {} partner {}: {}",
                    context.program.id, context.partner.id, e
                );
                None
            }
        }
    }

    /// Evaluate a partner application. Nothing is persisted.
    pub async fn assess_partner(&self, context: &FraudEvaluationContext) -> Option<RiskAssessment> {
        self.evaluate(RuleScope::Partner, context).await
    }

    /// Run every enabled rule of `scope` and aggregate the result.
    ///
    /// `None` on safelist bypass, invalid context or override load failure.
    pub async fn evaluate(
        &self,
        scope: RuleScope,
        context: &FraudEvaluationContext,
    ) -> Option<RiskAssessment> {
        if context.is_safelisted() {
            debug!(
                "Partner {} is safelisted, skipping fraud evaluation",
                context.partner.id
            );
            return None;
        }

        if let Err(e) = context.validate(scope) {
            warn!("Invalid fraud evaluation context for {} rules: {}", scope, e);
            return None;
        }

        let program_id = context.program.id.as_str();
        let overrides = match self.overrides.list_overrides(program_id).await {
            Ok(overrides) => overrides,
            Err(e) => {
                error!("Failed to load fraud rule overrides for program {}: {}", program_id, e);
                return None;
            }
        };

        let enabled: Vec<MergedRule> = merge_rules(program_id, &overrides, self.registry())
            .into_iter()
            .filter(|rule| rule.enabled && rule.scope == scope)
            .collect();

        let context_value = match serde_json::to_value(context) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize fraud evaluation context: {}", e);
                return None;
            }
        };

        let outcomes = join_all(enabled.iter().map(|rule| self.run_rule(rule, &context_value))).await;

        let mut triggered = Vec::new();
        let mut failed = Vec::new();
        for (rule, outcome) in enabled.iter().zip(outcomes) {
            match outcome {
                Some(outcome) if outcome.triggered => triggered.push(TriggeredRule {
                    rule_type: rule.rule_type,
                    risk_level: rule.risk_level,
                    reason_code: outcome.reason_code,
                    metadata: outcome.metadata,
                }),
                Some(_) => {}
                None => failed.push(rule.rule_type),
            }
        }

        let assessment = RiskAssessment::aggregate(&self.policy, triggered, enabled.len(), failed);
        debug!(
            "Evaluated {} {} rules for program {}: {} triggered, {} failed",
            assessment.evaluated_rules,
            scope,
            program_id,
            assessment.triggered_rules.len(),
            assessment.failed_rules.len()
        );
        Some(assessment)
    }

    /// Run one rule; errors and timeouts are logged and read as `None`
    async fn run_rule(&self, rule: &MergedRule, context: &Value) -> Option<RuleOutcome> {
        let execution = self
            .executor
            .execute(rule.rule_type, context, rule.config.as_ref());

        match tokio::time::timeout(self.rule_timeout, execution).await {
            Ok(Ok(outcome)) => {
                debug!("Rule {} triggered: {}", rule.rule_type, outcome.triggered);
                Some(outcome)
            }
            Ok(Err(e)) => {
                warn!("Fraud rule {} failed: {}", rule.rule_type, e);
                None
            }
            Err(_) => {
                warn!(
                    "Fraud rule {} timed out after {:?}",
                    rule.rule_type, self.rule_timeout
                );
                None
            }
        }
    }
}

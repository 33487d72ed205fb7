//! Rule Executor
//!
//! Runs a single rule by type against raw JSON inputs.

use crate::error::{Result, RuntimeError};
use crate::registry::RuleRegistry;
use crate::rules::{RuleEnv, RuleOutcome};
use fraudguard_core::FraudRuleType;
use serde_json::Value;
use std::sync::Arc;

/// Executes rules from a registry with a shared environment
#[derive(Clone, Debug)]
pub struct RuleExecutor {
    registry: Arc<RuleRegistry>,
    env: RuleEnv,
}

impl RuleExecutor {
    pub fn new(registry: Arc<RuleRegistry>, env: RuleEnv) -> Self {
        Self { registry, env }
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    pub fn env(&self) -> &RuleEnv {
        &self.env
    }

    /// Execute `rule_type`.
    ///
    /// Absent and reserved rules are [`RuntimeError::RuleNotFound`]; a context
    /// the rule cannot parse is [`RuntimeError::InvalidContext`]. The rule's
    /// own result or error is returned unchanged.
    pub async fn execute(
        &self,
        rule_type: FraudRuleType,
        context: &Value,
        config: Option<&Value>,
    ) -> Result<RuleOutcome> {
        let rule = self
            .registry
            .get(rule_type)
            .ok_or_else(|| RuntimeError::RuleNotFound(rule_type.to_string()))?;

        tracing::debug!("Executing rule {}", rule_type);
        rule.execute(context, config, &self.env).await
    }
}

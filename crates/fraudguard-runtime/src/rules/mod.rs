//! Fraud rule definitions
//!
//! Every catalog entry implements [`Rule`] with its own typed context slice
//! and config. The executor reaches them through the object-safe [`DynRule`],
//! which parses the raw JSON inputs into those types first.

mod context;
mod cross_program_ban;
mod email_domain;
mod paid_traffic;
mod placeholder;
mod self_referral;
mod social;

pub use context::{
    ClickView, CrossProgramBanContext, CustomerEmailContext, EmailView, PaidTrafficContext,
    PartnerEmailContext, PartnerProfileContext, PersonView, SelfReferralContext,
};
pub use cross_program_ban::PartnerCrossProgramBan;
pub use email_domain::{
    BannedReferralDomain, BannedReferralDomainConfig, CustomerEmailSuspiciousDomain,
    PartnerEmailDomainMismatch, PartnerEmailMasked, PartnerEmailSuspiciousDomain,
    APPLE_PRIVATE_RELAY_DOMAIN,
};
pub use paid_traffic::{PaidAdTraffic, PaidAdTrafficConfig};
pub use placeholder::Placeholder;
pub use self_referral::{SelfReferral, SelfReferralConfig};
pub use social::{PartnerNoSocialLinks, PartnerNoVerifiedSocialLinks};

use crate::error::{Result, RuntimeError};
use crate::lists::{ListService, DISPOSABLE_EMAIL_DOMAINS};
use async_trait::async_trait;
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use fraudguard_repository::{EnrollmentRepository, MemoryRepository};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Result of evaluating one rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl RuleOutcome {
    pub fn not_triggered() -> Self {
        Self::default()
    }

    pub fn triggered(reason_code: impl Into<String>) -> Self {
        Self {
            triggered: true,
            reason_code: Some(reason_code.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Static description of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMetadata {
    pub rule_type: FraudRuleType,
    pub name: &'static str,
    pub description: &'static str,
    pub scope: RuleScope,
    pub default_risk_level: RiskLevel,
}

/// Config type for rules without tunable parameters.
///
/// Accepts any input, so stray override config never fails these rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoConfig;

impl<'de> Deserialize<'de> for NoConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(NoConfig)
    }
}

/// A typed fraud rule
#[async_trait]
pub trait Rule: Send + Sync + 'static {
    /// The slice of the evaluation context this rule reads
    type Context: DeserializeOwned + Send + Sync;

    /// Tunable parameters; `Default` is the catalog default config
    type Config: DeserializeOwned + Serialize + Default + Send + Sync;

    fn metadata(&self) -> RuleMetadata;

    /// Semantic checks beyond what deserialization enforces
    fn validate_config(&self, _config: &Self::Config) -> Result<()> {
        Ok(())
    }

    /// Evaluate the rule. Missing optional inputs yield a not-triggered outcome.
    async fn evaluate(
        &self,
        context: &Self::Context,
        config: &Self::Config,
        env: &RuleEnv,
    ) -> Result<RuleOutcome>;
}

/// Object-safe view of a [`Rule`] over raw JSON inputs
#[async_trait]
pub trait DynRule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    /// Default config as JSON, `None` when the rule has no parameters
    fn default_config(&self) -> Option<Value>;

    /// Parse the inputs and evaluate.
    ///
    /// A null or absent config means the default config.
    async fn execute(
        &self,
        context: &Value,
        config: Option<&Value>,
        env: &RuleEnv,
    ) -> Result<RuleOutcome>;
}

#[async_trait]
impl<R: Rule> DynRule for R {
    fn metadata(&self) -> RuleMetadata {
        Rule::metadata(self)
    }

    fn default_config(&self) -> Option<Value> {
        match serde_json::to_value(R::Config::default()) {
            Ok(Value::Null) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    async fn execute(
        &self,
        context: &Value,
        config: Option<&Value>,
        env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let rule = Rule::metadata(self).rule_type.as_str();

        let parsed_context =
            R::Context::deserialize(context).map_err(|e| RuntimeError::InvalidContext {
                rule: rule.to_string(),
                reason: e.to_string(),
            })?;

        let parsed_config = match config {
            None | Some(Value::Null) => R::Config::default(),
            Some(value) => {
                R::Config::deserialize(value).map_err(|e| RuntimeError::InvalidConfig {
                    rule: rule.to_string(),
                    reason: e.to_string(),
                })?
            }
        };
        self.validate_config(&parsed_config)?;

        self.evaluate(&parsed_context, &parsed_config, env).await
    }
}

/// Read-only services the rules may consult
#[derive(Clone)]
pub struct RuleEnv {
    lists: ListService,
    enrollments: Arc<dyn EnrollmentRepository>,
    disposable_list_key: String,
    lookup_timeout: Duration,
}

impl Default for RuleEnv {
    fn default() -> Self {
        Self::new(ListService::empty(), Arc::new(MemoryRepository::new()))
    }
}

impl RuleEnv {
    pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new(lists: ListService, enrollments: Arc<dyn EnrollmentRepository>) -> Self {
        Self {
            lists,
            enrollments,
            disposable_list_key: DISPOSABLE_EMAIL_DOMAINS.to_string(),
            lookup_timeout: Self::DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_disposable_list_key(mut self, key: impl Into<String>) -> Self {
        self.disposable_list_key = key.into();
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn lists(&self) -> &ListService {
        &self.lists
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Membership of `domain` (lowercased) in the disposable domain set.
    ///
    /// Fails open: an errored or timed-out lookup is logged and reads as
    /// "not a member".
    pub async fn is_disposable_domain(&self, domain: &str) -> bool {
        let domain = domain.trim().to_lowercase();
        let lookup = self.bounded(
            "disposable domain lookup",
            self.lists.contains(&self.disposable_list_key, &domain),
        );
        match lookup.await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    "Disposable domain lookup for '{}' failed, treating as not listed: {}",
                    domain,
                    e
                );
                false
            }
        }
    }

    /// Programs other than `program_id` in which the partner is banned.
    ///
    /// Fails open to an empty list.
    pub async fn banned_program_ids(&self, partner_id: &str, program_id: &str) -> Vec<String> {
        let lookup = self.bounded("enrollment lookup", async {
            self.enrollments
                .banned_program_ids(partner_id, program_id)
                .await
                .map_err(RuntimeError::from)
        });
        match lookup.await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    "Enrollment lookup for partner '{}' failed, treating as not banned: {}",
                    partner_id,
                    e
                );
                Vec::new()
            }
        }
    }

    async fn bounded<T, F>(&self, what: &str, lookup: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::Timeout(format!(
                "{} exceeded {:?}",
                what, self.lookup_timeout
            ))),
        }
    }
}

impl std::fmt::Debug for RuleEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEnv")
            .field("lists", &self.lists)
            .field("disposable_list_key", &self.disposable_list_key)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish()
    }
}

/// Domain part of an email, lowercased
pub(crate) fn email_domain(email: Option<&str>) -> Option<String> {
    let email = email?.trim();
    fraudguard_core::similarity::extract_email_parts(email)
        .map(|parts| parts.domain.to_lowercase())
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::ListBackend;
    use std::collections::HashMap;

    struct Echo;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct EchoConfig {
        #[serde(default)]
        fire: bool,
    }

    #[async_trait]
    impl Rule for Echo {
        type Context = Value;
        type Config = EchoConfig;

        fn metadata(&self) -> RuleMetadata {
            RuleMetadata {
                rule_type: FraudRuleType::PartnerIpSuspicious,
                name: "Echo",
                description: "Triggers when configured to",
                scope: RuleScope::Partner,
                default_risk_level: RiskLevel::Low,
            }
        }

        async fn evaluate(
            &self,
            _context: &Value,
            config: &EchoConfig,
            _env: &RuleEnv,
        ) -> Result<RuleOutcome> {
            Ok(if config.fire {
                RuleOutcome::triggered("echo")
            } else {
                RuleOutcome::not_triggered()
            })
        }
    }

    struct Failing;

    #[async_trait]
    impl ListBackend for Failing {
        async fn contains(&self, _list_id: &str, _value: &str) -> Result<bool> {
            Err(RuntimeError::Lookup("connection refused".to_string()))
        }
        async fn add(&self, _list_id: &str, _value: String) -> Result<()> {
            Ok(())
        }
        async fn remove(&self, _list_id: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn get_all(&self, _list_id: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_null_config_uses_default() {
        let env = RuleEnv::default();
        let ctx = serde_json::json!({});

        let outcome = Echo.execute(&ctx, Some(&Value::Null), &env).await.unwrap();
        assert!(!outcome.triggered);

        let outcome = Echo
            .execute(&ctx, Some(&serde_json::json!({"fire": true})), &env)
            .await
            .unwrap();
        assert_eq!(outcome.reason_code.as_deref(), Some("echo"));
    }

    #[tokio::test]
    async fn test_malformed_config_is_invalid_config() {
        let env = RuleEnv::default();
        let err = Echo
            .execute(&serde_json::json!({}), Some(&serde_json::json!({"fire": "yes"})), &env)
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConfig { .. }));
    }

    #[test]
    fn test_no_config_accepts_anything() {
        let parsed: NoConfig = serde_json::from_value(serde_json::json!({"a": [1, 2]})).unwrap();
        assert_eq!(parsed, NoConfig);
        assert_eq!(serde_json::to_value(NoConfig).unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_disposable_lookup_is_case_insensitive() {
        let env = RuleEnv::new(
            ListService::with_memory_list(DISPOSABLE_EMAIL_DOMAINS, ["mailinator.com"]),
            Arc::new(MemoryRepository::new()),
        );
        assert!(env.is_disposable_domain("Mailinator.COM").await);
        assert!(!env.is_disposable_domain("gmail.com").await);
    }

    #[tokio::test]
    async fn test_mixed_case_list_entry_matches() {
        let env = RuleEnv::new(
            ListService::with_memory_list(DISPOSABLE_EMAIL_DOMAINS, ["Mailinator.com"]),
            Arc::new(MemoryRepository::new()),
        );
        assert!(env.is_disposable_domain("mailinator.com").await);
    }

    #[tokio::test]
    async fn test_disposable_lookup_fails_open() {
        let mut backends: HashMap<String, Arc<dyn ListBackend>> = HashMap::new();
        backends.insert(DISPOSABLE_EMAIL_DOMAINS.to_string(), Arc::new(Failing));
        let env = RuleEnv::new(
            ListService::new_with_backends(backends),
            Arc::new(MemoryRepository::new()),
        );
        assert!(!env.is_disposable_domain("mailinator.com").await);
    }

    #[tokio::test]
    async fn test_custom_list_key() {
        let env = RuleEnv::new(
            ListService::with_memory_list("burners", ["yopmail.com"]),
            Arc::new(MemoryRepository::new()),
        )
        .with_disposable_list_key("burners");
        assert!(env.is_disposable_domain("yopmail.com").await);
        assert!(!RuleEnv::default().is_disposable_domain("yopmail.com").await);
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain(Some(" Bob@Example.COM ")), Some("example.com".to_string()));
        assert_eq!(email_domain(Some("not-an-email")), None);
        assert_eq!(email_domain(None), None);
    }
}

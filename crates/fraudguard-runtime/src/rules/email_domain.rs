//! Email domain rules

use super::{
    email_domain, CustomerEmailContext, NoConfig, PartnerEmailContext, PartnerProfileContext, Rule,
    RuleEnv, RuleMetadata, RuleOutcome,
};
use crate::error::Result;
use async_trait::async_trait;
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

/// Domain of Apple's "Hide My Email" relay addresses
pub const APPLE_PRIVATE_RELAY_DOMAIN: &str = "privaterelay.appleid.com";

async fn disposable_outcome(email: Option<&str>, env: &RuleEnv) -> RuleOutcome {
    let Some(domain) = email_domain(email) else {
        return RuleOutcome::not_triggered();
    };
    if env.is_disposable_domain(&domain).await {
        RuleOutcome::triggered("disposable_email_domain").with_metadata(json!({ "domain": domain }))
    } else {
        RuleOutcome::not_triggered()
    }
}

/// `true` when `domain` equals `parent` or is one of its subdomains
pub(crate) fn domain_matches(domain: &str, parent: &str) -> bool {
    let parent = parent.trim().trim_start_matches('.').to_lowercase();
    if parent.is_empty() {
        return false;
    }
    domain == parent || domain.ends_with(&format!(".{}", parent))
}

pub struct CustomerEmailSuspiciousDomain;

#[async_trait]
impl Rule for CustomerEmailSuspiciousDomain {
    type Context = CustomerEmailContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::CustomerEmailSuspiciousDomain,
            name: "Suspicious customer email domain",
            description: "Customer signed up with a disposable email provider",
            scope: RuleScope::ConversionEvent,
            default_risk_level: RiskLevel::Medium,
        }
    }

    async fn evaluate(
        &self,
        context: &CustomerEmailContext,
        _config: &NoConfig,
        env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        Ok(disposable_outcome(context.customer.email.as_deref(), env).await)
    }
}

pub struct PartnerEmailSuspiciousDomain;

#[async_trait]
impl Rule for PartnerEmailSuspiciousDomain {
    type Context = PartnerEmailContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerEmailSuspiciousDomain,
            name: "Suspicious partner email domain",
            description: "Partner applied with a disposable email provider",
            scope: RuleScope::Partner,
            default_risk_level: RiskLevel::Medium,
        }
    }

    async fn evaluate(
        &self,
        context: &PartnerEmailContext,
        _config: &NoConfig,
        env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        Ok(disposable_outcome(context.partner.email.as_deref(), env).await)
    }
}

pub struct PartnerEmailMasked;

#[async_trait]
impl Rule for PartnerEmailMasked {
    type Context = PartnerEmailContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerEmailMasked,
            name: "Masked partner email",
            description: "Partner email is an Apple private relay address",
            scope: RuleScope::Partner,
            default_risk_level: RiskLevel::Low,
        }
    }

    async fn evaluate(
        &self,
        context: &PartnerEmailContext,
        _config: &NoConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        match email_domain(context.partner.email.as_deref()) {
            Some(domain) if domain == APPLE_PRIVATE_RELAY_DOMAIN => {
                Ok(RuleOutcome::triggered("masked_email").with_metadata(json!({ "domain": domain })))
            }
            _ => Ok(RuleOutcome::not_triggered()),
        }
    }
}

pub struct PartnerEmailDomainMismatch;

#[async_trait]
impl Rule for PartnerEmailDomainMismatch {
    type Context = PartnerProfileContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerEmailDomainMismatch,
            name: "Partner email domain mismatch",
            description: "Partner website host differs from their email domain",
            scope: RuleScope::Partner,
            default_risk_level: RiskLevel::Low,
        }
    }

    async fn evaluate(
        &self,
        context: &PartnerProfileContext,
        _config: &NoConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let partner = &context.partner;
        let Some(domain) = email_domain(partner.email.as_deref()) else {
            return Ok(RuleOutcome::not_triggered());
        };
        let Some(website) = partner.website.as_deref().map(str::trim).filter(|w| !w.is_empty())
        else {
            return Ok(RuleOutcome::not_triggered());
        };

        let host = match Url::parse(website) {
            Ok(url) => match url.host_str() {
                Some(host) => host.to_lowercase(),
                None => return Ok(RuleOutcome::not_triggered()),
            },
            Err(e) => {
                tracing::debug!("Partner website '{}' is not a URL: {}", website, e);
                return Ok(RuleOutcome::not_triggered());
            }
        };

        if host == domain {
            Ok(RuleOutcome::not_triggered())
        } else {
            Ok(RuleOutcome::triggered("email_domain_mismatch").with_metadata(json!({
                "websiteHost": host,
                "emailDomain": domain,
            })))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BannedReferralDomainConfig {
    #[serde(default)]
    pub domains: Vec<String>,
}

pub struct BannedReferralDomain;

#[async_trait]
impl Rule for BannedReferralDomain {
    type Context = CustomerEmailContext;
    type Config = BannedReferralDomainConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::BannedReferralDomain,
            name: "Banned referral domain",
            description: "Customer email domain is on the program's ban list",
            scope: RuleScope::ConversionEvent,
            default_risk_level: RiskLevel::High,
        }
    }

    async fn evaluate(
        &self,
        context: &CustomerEmailContext,
        config: &BannedReferralDomainConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let Some(domain) = email_domain(context.customer.email.as_deref()) else {
            return Ok(RuleOutcome::not_triggered());
        };

        match config.domains.iter().find(|banned| domain_matches(&domain, banned)) {
            Some(banned) => Ok(RuleOutcome::triggered("banned_referral_domain").with_metadata(
                json!({ "domain": domain, "bannedDomain": banned }),
            )),
            None => Ok(RuleOutcome::not_triggered()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::{ListService, DISPOSABLE_EMAIL_DOMAINS};
    use crate::rules::EmailView;
    use fraudguard_core::PartnerInfo;
    use fraudguard_repository::MemoryRepository;
    use std::sync::Arc;

    fn env() -> RuleEnv {
        RuleEnv::new(
            ListService::with_memory_list(DISPOSABLE_EMAIL_DOMAINS, ["mailinator.com"]),
            Arc::new(MemoryRepository::new()),
        )
    }

    fn customer(email: Option<&str>) -> CustomerEmailContext {
        CustomerEmailContext {
            customer: EmailView {
                email: email.map(str::to_string),
            },
        }
    }

    fn profile(partner: PartnerInfo) -> PartnerProfileContext {
        PartnerProfileContext { partner }
    }

    #[tokio::test]
    async fn test_disposable_customer_domain() {
        let rule = CustomerEmailSuspiciousDomain;
        let hit = rule
            .evaluate(&customer(Some("x@Mailinator.com")), &NoConfig, &env())
            .await
            .unwrap();
        assert_eq!(hit.reason_code.as_deref(), Some("disposable_email_domain"));

        let miss = rule
            .evaluate(&customer(Some("x@gmail.com")), &NoConfig, &env())
            .await
            .unwrap();
        assert!(!miss.triggered);

        let none = rule.evaluate(&customer(None), &NoConfig, &env()).await.unwrap();
        assert!(!none.triggered);
    }

    #[tokio::test]
    async fn test_masked_email() {
        let ctx = PartnerEmailContext {
            partner: EmailView {
                email: Some("abc123@privaterelay.appleid.com".to_string()),
            },
        };
        let outcome = PartnerEmailMasked
            .evaluate(&ctx, &NoConfig, &RuleEnv::default())
            .await
            .unwrap();
        assert_eq!(outcome.reason_code.as_deref(), Some("masked_email"));
    }

    #[tokio::test]
    async fn test_domain_mismatch() {
        let rule = PartnerEmailDomainMismatch;
        let env = RuleEnv::default();

        let matching = profile(
            PartnerInfo::new("pn_1")
                .with_email("me@Acme.com")
                .with_website("https://ACME.com/about"),
        );
        assert!(!rule.evaluate(&matching, &NoConfig, &env).await.unwrap().triggered);

        let different = profile(
            PartnerInfo::new("pn_1")
                .with_email("me@gmail.com")
                .with_website("https://acme.com"),
        );
        let outcome = rule.evaluate(&different, &NoConfig, &env).await.unwrap();
        assert_eq!(outcome.reason_code.as_deref(), Some("email_domain_mismatch"));
    }

    #[tokio::test]
    async fn test_domain_mismatch_no_ops() {
        let rule = PartnerEmailDomainMismatch;
        let env = RuleEnv::default();

        let no_website = profile(PartnerInfo::new("pn_1").with_email("me@gmail.com"));
        assert!(!rule.evaluate(&no_website, &NoConfig, &env).await.unwrap().triggered);

        let no_email = profile(PartnerInfo::new("pn_1").with_website("https://acme.com"));
        assert!(!rule.evaluate(&no_email, &NoConfig, &env).await.unwrap().triggered);

        let unparsable = profile(
            PartnerInfo::new("pn_1")
                .with_email("me@gmail.com")
                .with_website("acme dot com"),
        );
        assert!(!rule.evaluate(&unparsable, &NoConfig, &env).await.unwrap().triggered);
    }

    #[tokio::test]
    async fn test_banned_referral_domain() {
        let config = BannedReferralDomainConfig {
            domains: vec!["Spam.example".to_string()],
        };
        let rule = BannedReferralDomain;
        let env = RuleEnv::default();

        let exact = rule
            .evaluate(&customer(Some("a@spam.example")), &config, &env)
            .await
            .unwrap();
        assert_eq!(exact.reason_code.as_deref(), Some("banned_referral_domain"));

        let sub = rule
            .evaluate(&customer(Some("a@mx.spam.example")), &config, &env)
            .await
            .unwrap();
        assert!(sub.triggered);

        let lookalike = rule
            .evaluate(&customer(Some("a@notspam.example")), &config, &env)
            .await
            .unwrap();
        assert!(!lookalike.triggered);

        let empty = rule
            .evaluate(&customer(Some("a@spam.example")), &BannedReferralDomainConfig::default(), &env)
            .await
            .unwrap();
        assert!(!empty.triggered);
    }
}

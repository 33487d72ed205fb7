//! Self-referral detection
//!
//! Compares the partner with the customer they referred. Checks run in a
//! fixed order and the first match wins:
//!
//! 1. exact normalized email
//! 2. similar domain with equal or near-equal username
//! 3. Levenshtein similarity of the normalized emails
//! 4. exact normalized name
//! 5. Levenshtein similarity of the normalized names

use super::{PersonView, Rule, RuleEnv, RuleMetadata, RuleOutcome, SelfReferralContext};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use fraudguard_core::similarity::{
    calculate_similarity, check_domain_similarity, extract_email_parts, normalize_email,
    normalize_name, DomainSimilarityReason,
};
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use serde::{Deserialize, Serialize};
use serde_json::json;

fn enabled() -> bool {
    true
}

fn default_threshold() -> f64 {
    0.8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfReferralConfig {
    /// Gates the exact email and exact name checks
    #[serde(default = "enabled")]
    pub check_exact_match: bool,
    #[serde(default = "enabled")]
    pub check_domain_variations: bool,
    /// Gates the email and name similarity checks
    #[serde(default = "enabled")]
    pub check_levenshtein: bool,
    #[serde(default = "enabled")]
    pub check_email_match: bool,
    #[serde(default = "enabled")]
    pub check_name_match: bool,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_threshold")]
    pub name_similarity_threshold: f64,
}

impl Default for SelfReferralConfig {
    fn default() -> Self {
        Self {
            check_exact_match: true,
            check_domain_variations: true,
            check_levenshtein: true,
            check_email_match: true,
            check_name_match: true,
            similarity_threshold: default_threshold(),
            name_similarity_threshold: default_threshold(),
        }
    }
}

pub struct SelfReferral;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SelfReferral {
    fn check_emails(
        partner: &str,
        customer: &str,
        config: &SelfReferralConfig,
    ) -> Option<RuleOutcome> {
        let partner_norm = normalize_email(partner);
        let customer_norm = normalize_email(customer);
        if partner_norm.is_empty() || customer_norm.is_empty() {
            return None;
        }

        if config.check_exact_match && partner_norm == customer_norm {
            return Some(RuleOutcome::triggered("email_exact_match").with_metadata(json!({
                "partnerEmail": partner_norm,
                "customerEmail": customer_norm,
            })));
        }

        if config.check_domain_variations {
            if let (Some(p), Some(c)) = (
                extract_email_parts(&partner_norm),
                extract_email_parts(&customer_norm),
            ) {
                let domains = check_domain_similarity(&p.domain, &c.domain);
                if domains.is_similar {
                    let username_similarity = calculate_similarity(&p.username, &c.username);
                    let usernames_match = match domains.reason {
                        DomainSimilarityReason::ExactMatch => p.username == c.username,
                        _ => username_similarity >= config.similarity_threshold,
                    };
                    if usernames_match {
                        return Some(RuleOutcome::triggered("email_domain_variation").with_metadata(
                            json!({
                                "partnerDomain": p.domain,
                                "customerDomain": c.domain,
                                "domainSimilarity": domains.score,
                                "usernameSimilarity": username_similarity,
                            }),
                        ));
                    }
                }
            }
        }

        if config.check_levenshtein {
            let similarity = calculate_similarity(&partner_norm, &customer_norm);
            if similarity >= config.similarity_threshold {
                return Some(RuleOutcome::triggered("email_levenshtein_match").with_metadata(
                    json!({
                        "similarity": similarity,
                        "threshold": config.similarity_threshold,
                    }),
                ));
            }
        }

        None
    }

    fn check_names(partner: &str, customer: &str, config: &SelfReferralConfig) -> Option<RuleOutcome> {
        let partner_norm = normalize_name(partner);
        let customer_norm = normalize_name(customer);
        if partner_norm.is_empty() || customer_norm.is_empty() {
            return None;
        }

        if config.check_exact_match && partner_norm == customer_norm {
            return Some(RuleOutcome::triggered("name_exact_match").with_metadata(json!({
                "partnerName": partner_norm,
                "customerName": customer_norm,
            })));
        }

        if config.check_levenshtein {
            let similarity = calculate_similarity(&partner_norm, &customer_norm);
            if similarity >= config.name_similarity_threshold {
                return Some(RuleOutcome::triggered("name_levenshtein_match").with_metadata(
                    json!({
                        "similarity": similarity,
                        "threshold": config.name_similarity_threshold,
                    }),
                ));
            }
        }

        None
    }

    fn present(person: &PersonView) -> (Option<&str>, Option<&str>) {
        (non_blank(&person.email), non_blank(&person.name))
    }
}

#[async_trait]
impl Rule for SelfReferral {
    type Context = SelfReferralContext;
    type Config = SelfReferralConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::SelfReferral,
            name: "Self referral",
            description: "Partner and customer share the same or a very similar email or name",
            scope: RuleScope::ConversionEvent,
            default_risk_level: RiskLevel::High,
        }
    }

    fn validate_config(&self, config: &SelfReferralConfig) -> Result<()> {
        for (field, value) in [
            ("similarityThreshold", config.similarity_threshold),
            ("nameSimilarityThreshold", config.name_similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RuntimeError::InvalidConfig {
                    rule: FraudRuleType::SelfReferral.to_string(),
                    reason: format!("{} must be within [0, 1], got {}", field, value),
                });
            }
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        context: &SelfReferralContext,
        config: &SelfReferralConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let (partner_email, partner_name) = Self::present(&context.partner);
        let (customer_email, customer_name) = Self::present(&context.customer);

        if config.check_email_match {
            if let (Some(p), Some(c)) = (partner_email, customer_email) {
                if let Some(outcome) = Self::check_emails(p, c, config) {
                    return Ok(outcome);
                }
            }
        }

        if config.check_name_match {
            if let (Some(p), Some(c)) = (partner_name, customer_name) {
                if let Some(outcome) = Self::check_names(p, c, config) {
                    return Ok(outcome);
                }
            }
        }

        Ok(RuleOutcome::not_triggered())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(partner: (&str, &str), customer: (&str, &str)) -> SelfReferralContext {
        let person = |(email, name): (&str, &str)| PersonView {
            email: Some(email.to_string()).filter(|s| !s.is_empty()),
            name: Some(name.to_string()).filter(|s| !s.is_empty()),
        };
        SelfReferralContext {
            partner: person(partner),
            customer: person(customer),
        }
    }

    async fn run(context: SelfReferralContext, config: SelfReferralConfig) -> RuleOutcome {
        SelfReferral
            .evaluate(&context, &config, &RuleEnv::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_exact_email_match() {
        let outcome = run(ctx(("a@x.com", ""), ("a@x.com", "")), SelfReferralConfig::default()).await;
        assert!(outcome.triggered);
        assert_eq!(outcome.reason_code.as_deref(), Some("email_exact_match"));
    }

    #[tokio::test]
    async fn test_gmail_normalization_counts_as_exact() {
        let outcome = run(
            ctx(("John.Doe+promo@gmail.com", ""), ("johndoe@gmail.com", "")),
            SelfReferralConfig::default(),
        )
        .await;
        assert_eq!(outcome.reason_code.as_deref(), Some("email_exact_match"));
    }

    #[tokio::test]
    async fn test_domain_variation() {
        let outcome = run(
            ctx(("steven@acme.com", ""), ("steven@acmee.com", "")),
            SelfReferralConfig::default(),
        )
        .await;
        assert_eq!(outcome.reason_code.as_deref(), Some("email_domain_variation"));
    }

    #[tokio::test]
    async fn test_levenshtein_email_when_domain_check_off() {
        let config = SelfReferralConfig {
            check_domain_variations: false,
            ..Default::default()
        };
        let outcome = run(ctx(("steven1@acme.com", ""), ("steven2@acme.com", "")), config).await;
        assert_eq!(outcome.reason_code.as_deref(), Some("email_levenshtein_match"));
    }

    #[tokio::test]
    async fn test_name_matches() {
        let outcome = run(
            ctx(("a@one.com", "John M. Smith"), ("zz@other.org", "Smith, John M.")),
            SelfReferralConfig::default(),
        )
        .await;
        assert_eq!(outcome.reason_code.as_deref(), Some("name_exact_match"));

        let outcome = run(
            ctx(("", "Jonathan Smith"), ("", "Jonathon Smith")),
            SelfReferralConfig::default(),
        )
        .await;
        assert_eq!(outcome.reason_code.as_deref(), Some("name_levenshtein_match"));
    }

    #[tokio::test]
    async fn test_unrelated_people() {
        let outcome = run(
            ctx(("alice@wonderland.io", "Alice Liddell"), ("bob@builder.com", "Bob Builder")),
            SelfReferralConfig::default(),
        )
        .await;
        assert_eq!(outcome, RuleOutcome::not_triggered());
    }

    #[tokio::test]
    async fn test_flags_disable_checks() {
        let config = SelfReferralConfig {
            check_email_match: false,
            ..Default::default()
        };
        let outcome = run(ctx(("a@x.com", ""), ("a@x.com", "")), config).await;
        assert!(!outcome.triggered);

        let config = SelfReferralConfig {
            check_exact_match: false,
            check_domain_variations: false,
            check_levenshtein: false,
            ..Default::default()
        };
        let outcome = run(ctx(("a@x.com", "Ann Lee"), ("a@x.com", "Ann Lee")), config).await;
        assert!(!outcome.triggered);
    }

    #[tokio::test]
    async fn test_missing_fields_do_not_trigger() {
        let outcome = run(ctx(("", ""), ("a@x.com", "Ann")), SelfReferralConfig::default()).await;
        assert!(!outcome.triggered);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = SelfReferralConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(SelfReferral.validate_config(&config).is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: SelfReferralConfig =
            serde_json::from_value(json!({"similarityThreshold": 0.9})).unwrap();
        assert!(config.check_exact_match);
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.name_similarity_threshold, 0.8);
    }
}

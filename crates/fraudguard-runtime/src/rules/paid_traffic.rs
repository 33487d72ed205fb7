//! Paid ad traffic detection
//!
//! A click counts as paid traffic when its URL carries an ad-click tracking
//! parameter and its referer is an ad network. Both conditions are required.

use super::email_domain::domain_matches;
use super::{PaidTrafficContext, Rule, RuleEnv, RuleMetadata, RuleOutcome};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

const DEFAULT_AD_PARAMS: &[&str] = &[
    "gclid",
    "gad_source",
    "gbraid",
    "wbraid",
    "msclkid",
    "fbclid",
    "ttclid",
    "twclid",
    "li_fat_id",
];

const DEFAULT_AD_REFERRERS: &[&str] = &[
    "google.com",
    "bing.com",
    "facebook.com",
    "tiktok.com",
    "x.com",
    "linkedin.com",
];

fn default_params() -> Vec<String> {
    DEFAULT_AD_PARAMS.iter().map(|s| s.to_string()).collect()
}

fn default_referrers() -> Vec<String> {
    DEFAULT_AD_REFERRERS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidAdTrafficConfig {
    #[serde(default = "default_params")]
    pub query_params: Vec<String>,
    #[serde(default = "default_referrers")]
    pub referrers: Vec<String>,
}

impl Default for PaidAdTrafficConfig {
    fn default() -> Self {
        Self {
            query_params: default_params(),
            referrers: default_referrers(),
        }
    }
}

/// Host of a referer header value, falling back to the raw value when it
/// is not an absolute URL
fn referer_host(referer: &str) -> String {
    match Url::parse(referer) {
        Ok(url) => url.host_str().unwrap_or_default().to_lowercase(),
        Err(_) => referer
            .split('/')
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    }
}

pub struct PaidAdTraffic;

#[async_trait]
impl Rule for PaidAdTraffic {
    type Context = PaidTrafficContext;
    type Config = PaidAdTrafficConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PaidAdTraffic,
            name: "Paid ad traffic",
            description: "Click came from a paid ad that bid on the program's brand",
            scope: RuleScope::ConversionEvent,
            default_risk_level: RiskLevel::Medium,
        }
    }

    fn validate_config(&self, config: &PaidAdTrafficConfig) -> Result<()> {
        if config.query_params.iter().any(|p| p.trim().is_empty()) {
            return Err(RuntimeError::InvalidConfig {
                rule: FraudRuleType::PaidAdTraffic.to_string(),
                reason: "queryParams must not contain blank entries".to_string(),
            });
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        context: &PaidTrafficContext,
        config: &PaidAdTrafficConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let Some(click) = &context.click else {
            return Ok(RuleOutcome::not_triggered());
        };
        let (Some(url), Some(referer)) = (click.url.as_deref(), click.referer.as_deref()) else {
            return Ok(RuleOutcome::not_triggered());
        };

        let url = match Url::parse(url.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Click URL is not parseable: {}", e);
                return Ok(RuleOutcome::not_triggered());
            }
        };

        let Some(param) = url
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .find(|key| config.query_params.iter().any(|p| p == key))
        else {
            return Ok(RuleOutcome::not_triggered());
        };

        let host = referer_host(referer.trim());
        if host.is_empty() {
            return Ok(RuleOutcome::not_triggered());
        }

        match config.referrers.iter().find(|r| domain_matches(&host, r)) {
            Some(referrer) => Ok(RuleOutcome::triggered("paid_ad_traffic").with_metadata(json!({
                "queryParam": param,
                "referer": host,
                "matchedReferrer": referrer,
            }))),
            None => Ok(RuleOutcome::not_triggered()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_core::ClickInfo;

    async fn run(url: Option<&str>, referer: Option<&str>) -> RuleOutcome {
        let context = PaidTrafficContext {
            click: Some(ClickInfo {
                url: url.map(str::to_string),
                referer: referer.map(str::to_string),
            }),
        };
        PaidAdTraffic
            .evaluate(&context, &PaidAdTrafficConfig::default(), &RuleEnv::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_param_and_referer_trigger() {
        let outcome = run(
            Some("https://acme.com/?gclid=abc&utm_source=x"),
            Some("https://www.google.com/"),
        )
        .await;
        assert_eq!(outcome.reason_code.as_deref(), Some("paid_ad_traffic"));
    }

    #[tokio::test]
    async fn test_requires_both_signals() {
        // ad parameter without an ad referer
        assert!(!run(Some("https://acme.com/?gclid=abc"), Some("https://news.ycombinator.com")).await.triggered);
        // ad referer without an ad parameter
        assert!(!run(Some("https://acme.com/?ref=abc"), Some("https://google.com")).await.triggered);
        assert!(!run(Some("https://acme.com/?gclid=abc"), None).await.triggered);
    }

    #[tokio::test]
    async fn test_referer_without_scheme() {
        let outcome = run(Some("https://acme.com/?fbclid=1"), Some("Facebook.com/ads")).await;
        assert!(outcome.triggered);
    }

    #[tokio::test]
    async fn test_lookalike_referer_is_not_matched() {
        let outcome = run(Some("https://acme.com/?gclid=1"), Some("https://notgoogle.com")).await;
        assert!(!outcome.triggered);
    }

    #[tokio::test]
    async fn test_missing_click() {
        let outcome = PaidAdTraffic
            .evaluate(
                &PaidTrafficContext { click: None },
                &PaidAdTrafficConfig::default(),
                &RuleEnv::default(),
            )
            .await
            .unwrap();
        assert!(!outcome.triggered);
    }
}

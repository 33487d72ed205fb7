//! Partner profile link rules

use super::{NoConfig, PartnerProfileContext, Rule, RuleEnv, RuleMetadata, RuleOutcome};
use crate::error::Result;
use async_trait::async_trait;
use fraudguard_core::{FraudRuleType, PartnerInfo, RiskLevel, RuleScope};

fn has_any_link(partner: &PartnerInfo) -> bool {
    [
        &partner.website,
        &partner.youtube,
        &partner.twitter,
        &partner.linkedin,
        &partner.instagram,
        &partner.tiktok,
    ]
    .into_iter()
    .any(|link| link.as_deref().is_some_and(|l| !l.trim().is_empty()))
}

fn has_any_verified_link(partner: &PartnerInfo) -> bool {
    [
        partner.website_verified_at,
        partner.youtube_verified_at,
        partner.twitter_verified_at,
        partner.linkedin_verified_at,
        partner.instagram_verified_at,
        partner.tiktok_verified_at,
    ]
    .iter()
    .any(Option::is_some)
}

pub struct PartnerNoSocialLinks;

#[async_trait]
impl Rule for PartnerNoSocialLinks {
    type Context = PartnerProfileContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerNoSocialLinks,
            name: "No website or social links",
            description: "Partner profile lists no website and no social accounts",
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
        if has_any_link(&context.partner) {
            Ok(RuleOutcome::not_triggered())
        } else {
            Ok(RuleOutcome::triggered("no_social_links"))
        }
    }
}

pub struct PartnerNoVerifiedSocialLinks;

#[async_trait]
impl Rule for PartnerNoVerifiedSocialLinks {
    type Context = PartnerProfileContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerNoVerifiedSocialLinks,
            name: "No verified website or social links",
            description: "None of the partner's website or social accounts is verified",
            scope: RuleScope::Partner,
            default_risk_level: RiskLevel::Medium,
        }
    }

    async fn evaluate(
        &self,
        context: &PartnerProfileContext,
        _config: &NoConfig,
        _env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        if has_any_verified_link(&context.partner) {
            Ok(RuleOutcome::not_triggered())
        } else {
            Ok(RuleOutcome::triggered("no_verified_social_links"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn run<R: Rule<Context = PartnerProfileContext, Config = NoConfig>>(
        rule: R,
        partner: PartnerInfo,
    ) -> bool {
        rule.evaluate(&PartnerProfileContext { partner }, &NoConfig, &RuleEnv::default())
            .await
            .unwrap()
            .triggered
    }

    #[tokio::test]
    async fn test_no_social_links() {
        assert!(run(PartnerNoSocialLinks, PartnerInfo::new("pn_1")).await);

        let mut blank = PartnerInfo::new("pn_1");
        blank.twitter = Some("   ".to_string());
        assert!(run(PartnerNoSocialLinks, blank).await);

        let mut tiktok = PartnerInfo::new("pn_1");
        tiktok.tiktok = Some("@someone".to_string());
        assert!(!run(PartnerNoSocialLinks, tiktok).await);

        assert!(!run(PartnerNoSocialLinks, PartnerInfo::new("pn_1").with_website("https://a.io")).await);
    }

    #[tokio::test]
    async fn test_no_verified_social_links() {
        let unverified = PartnerInfo::new("pn_1").with_website("https://a.io");
        assert!(run(PartnerNoVerifiedSocialLinks, unverified).await);

        let mut verified = PartnerInfo::new("pn_1");
        verified.youtube = Some("chan".to_string());
        verified.youtube_verified_at = Some(Utc::now());
        assert!(!run(PartnerNoVerifiedSocialLinks, verified).await);
    }
}

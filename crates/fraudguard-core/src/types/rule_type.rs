//! Rule type identifiers

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleScope {
    /// Evaluated when a partner applies to or enrolls in a program
    #[serde(rename = "partner")]
    Partner,
    /// Evaluated when a sale or lead is recorded
    #[serde(rename = "conversionEvent")]
    ConversionEvent,
}

impl RuleScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleScope::Partner => "partner",
            RuleScope::ConversionEvent => "conversionEvent",
        }
    }
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! rule_types {
    ($($variant:ident => $id:literal),+ $(,)?) => {
        /// Identifier of a catalog entry.
        ///
        /// The declaration order is the catalog iteration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum FraudRuleType {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl FraudRuleType {
            /// Every rule type, in catalog order
            pub const ALL: &'static [FraudRuleType] = &[$(FraudRuleType::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FraudRuleType::$variant => $id,)+
                }
            }
        }

        impl FromStr for FraudRuleType {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($id => Ok(FraudRuleType::$variant),)+
                    other => Err(CoreError::UnknownRuleType(other.to_string())),
                }
            }
        }
    };
}

rule_types! {
    SelfReferral => "self_referral",
    CustomerEmailSuspiciousDomain => "customer_email_suspicious_domain",
    BannedReferralDomain => "banned_referral_domain",
    PaidAdTraffic => "paid_ad_traffic",
    CustomerIpSuspicious => "customer_ip_suspicious",
    ReferralSourceBanned => "referral_source_banned",
    PaidTrafficDetected => "paid_traffic_detected",
    CustomerIpVelocity => "customer_ip_velocity",
    PartnerEmailSuspiciousDomain => "partner_email_suspicious_domain",
    PartnerEmailMasked => "partner_email_masked",
    PartnerEmailDomainMismatch => "partner_email_domain_mismatch",
    PartnerNoSocialLinks => "partner_no_social_links",
    PartnerNoVerifiedSocialLinks => "partner_no_verified_social_links",
    PartnerCrossProgramBan => "partner_cross_program_ban",
    PartnerIpSuspicious => "partner_ip_suspicious",
    PartnerProgramBanned => "partner_program_banned",
    PartnerDuplicatePayoutMethod => "partner_duplicate_payout_method",
}

impl fmt::Display for FraudRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_identifiers() {
        for rule_type in FraudRuleType::ALL {
            assert_eq!(rule_type.as_str().parse::<FraudRuleType>().unwrap(), *rule_type);
        }
    }

    #[test]
    fn test_unknown_identifier() {
        let err = "not_a_rule".parse::<FraudRuleType>().unwrap_err();
        assert_eq!(err, CoreError::UnknownRuleType("not_a_rule".to_string()));
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&FraudRuleType::SelfReferral).unwrap();
        assert_eq!(json, "\"self_referral\"");

        let scope: RuleScope = serde_json::from_str("\"conversionEvent\"").unwrap();
        assert_eq!(scope, RuleScope::ConversionEvent);
    }
}

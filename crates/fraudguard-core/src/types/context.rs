//! Evaluation context supplied by conversion-recording and partner-enrollment flows

use super::rule_type::RuleScope;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a stored entity by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Partner profile fields the partner-scoped rules read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub tiktok: Option<String>,
    #[serde(default)]
    pub website_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub youtube_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub twitter_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub linkedin_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instagram_verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tiktok_verified_at: Option<DateTime<Utc>>,
    /// Non-null marks a trusted partner; evaluation is skipped entirely
    #[serde(default)]
    pub safelisted_at: Option<DateTime<Utc>>,
}

impl PartnerInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CustomerInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Click that led to the conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
}

/// Input of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudEvaluationContext {
    pub program: EntityRef,
    pub partner: PartnerInfo,
    #[serde(default)]
    pub customer: Option<CustomerInfo>,
    #[serde(default)]
    pub click: Option<ClickInfo>,
    #[serde(default)]
    pub commission: Option<EntityRef>,
    #[serde(default)]
    pub link: Option<EntityRef>,
    #[serde(default)]
    pub event: Option<EntityRef>,
}

impl FraudEvaluationContext {
    pub fn new(program_id: impl Into<String>, partner: PartnerInfo) -> Self {
        Self {
            program: EntityRef::new(program_id),
            partner,
            customer: None,
            click: None,
            commission: None,
            link: None,
            event: None,
        }
    }

    pub fn with_customer(mut self, customer: CustomerInfo) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_click(mut self, url: Option<String>, referer: Option<String>) -> Self {
        self.click = Some(ClickInfo { url, referer });
        self
    }

    pub fn with_commission(mut self, id: impl Into<String>) -> Self {
        self.commission = Some(EntityRef::new(id));
        self
    }

    pub fn with_link(mut self, id: impl Into<String>) -> Self {
        self.link = Some(EntityRef::new(id));
        self
    }

    pub fn with_event(mut self, id: impl Into<String>) -> Self {
        self.event = Some(EntityRef::new(id));
        self
    }

    /// Trusted partners bypass evaluation
    pub fn is_safelisted(&self) -> bool {
        self.partner.safelisted_at.is_some()
    }

    /// Structural validation for the given pipeline.
    ///
    /// Program and partner ids are always required; the conversion pipeline
    /// also requires a customer.
    pub fn validate(&self, scope: RuleScope) -> Result<()> {
        if self.program.id.trim().is_empty() {
            return Err(CoreError::MissingField("program.id".to_string()));
        }
        if self.partner.id.trim().is_empty() {
            return Err(CoreError::MissingField("partner.id".to_string()));
        }

        if scope == RuleScope::ConversionEvent {
            match &self.customer {
                None => return Err(CoreError::MissingField("customer".to_string())),
                Some(customer) if customer.id.trim().is_empty() => {
                    return Err(CoreError::MissingField("customer.id".to_string()))
                }
                Some(_) => {}
            }
        }

        for (field, entity) in [
            ("commission.id", &self.commission),
            ("link.id", &self.link),
            ("event.id", &self.event),
        ] {
            if matches!(entity, Some(e) if e.id.trim().is_empty()) {
                return Err(CoreError::InvalidValue(format!("{} must not be empty", field)));
            }
        }

        Ok(())
    }
}

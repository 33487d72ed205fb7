//! Context slices read by individual rules
//!
//! Each rule deserializes only the part of the evaluation context it needs.
//! Required objects (e.g. `customer` for conversion rules) fail parsing when
//! absent; optional leaf fields make the rule a no-op instead.

use fraudguard_core::{ClickInfo, EntityRef, PartnerInfo};
use serde::Deserialize;

/// Email and display name of a partner or customer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonView {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailView {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfReferralContext {
    pub partner: PersonView,
    pub customer: PersonView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerEmailContext {
    pub customer: EmailView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartnerEmailContext {
    pub partner: EmailView,
}

/// Full partner profile (links, verification timestamps, email)
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerProfileContext {
    pub partner: PartnerInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrossProgramBanContext {
    pub program: EntityRef,
    pub partner: EntityRef,
}

pub type ClickView = ClickInfo;

#[derive(Debug, Clone, Deserialize)]
pub struct PaidTrafficContext {
    #[serde(default)]
    pub click: Option<ClickView>,
}

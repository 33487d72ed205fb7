//! FraudGuard Core - Core types and definitions for the FraudGuard rule engine
//!
//! This crate provides the fundamental types used across the FraudGuard workspace:
//! - Risk levels and the risk policy table
//! - Rule type identifiers and scopes
//! - Evaluation context, rule overrides and fraud event records
//! - String similarity utilities used by the detection rules
//! - Error types

pub mod error;
pub mod similarity;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    ClickInfo, CustomerInfo, EntityRef, FraudEvaluationContext, FraudEvent, FraudRuleOverride,
    FraudRuleType, NewFraudEvent, PartnerInfo, RiskLevel, RiskPolicy, RiskWeights, RuleScope,
    TriggeredRule,
};

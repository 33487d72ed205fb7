//! Type definitions shared by every FraudGuard crate

pub mod context;
pub mod records;
pub mod risk;
pub mod rule_type;

pub use context::{ClickInfo, CustomerInfo, EntityRef, FraudEvaluationContext, PartnerInfo};
pub use records::{FraudEvent, FraudRuleOverride, NewFraudEvent, TriggeredRule};
pub use risk::{RiskLevel, RiskPolicy, RiskWeights};
pub use rule_type::{FraudRuleType, RuleScope};

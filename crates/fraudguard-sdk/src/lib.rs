//! FraudGuard SDK
//!
//! High-level API for fraud evaluation: build a [`FraudDetector`], then call
//! [`FraudDetector::detect_and_record_fraud`] when a conversion is recorded or
//! [`FraudDetector::assess_partner`] when a partner applies to a program.

pub mod builder;
pub mod config;
pub mod detector;
pub mod error;
pub mod observability;
pub mod score;

// Re-export main types
pub use builder::FraudDetectorBuilder;
pub use config::{DetectorConfig, PersistenceConfig};
pub use detector::FraudDetector;
pub use error::{Result, SdkError};
pub use score::RiskAssessment;

// Re-export commonly used types from dependencies
pub use fraudguard_core::{
    CustomerInfo, FraudEvaluationContext, FraudEvent, FraudRuleOverride, FraudRuleType,
    PartnerInfo, RiskLevel, RuleScope,
};

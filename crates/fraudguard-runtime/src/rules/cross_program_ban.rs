//! Cross-program ban rule

use super::{CrossProgramBanContext, NoConfig, Rule, RuleEnv, RuleMetadata, RuleOutcome};
use crate::error::Result;
use async_trait::async_trait;
use fraudguard_core::{FraudRuleType, RiskLevel, RuleScope};
use serde_json::json;

/// Triggers when the partner is banned in any other program
pub struct PartnerCrossProgramBan;

#[async_trait]
impl Rule for PartnerCrossProgramBan {
    type Context = CrossProgramBanContext;
    type Config = NoConfig;

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            rule_type: FraudRuleType::PartnerCrossProgramBan,
            name: "Banned in another program",
            description: "Partner has a banned enrollment in a different program",
            scope: RuleScope::Partner,
            default_risk_level: RiskLevel::High,
        }
    }

    async fn evaluate(
        &self,
        context: &CrossProgramBanContext,
        _config: &NoConfig,
        env: &RuleEnv,
    ) -> Result<RuleOutcome> {
        let banned = env
            .banned_program_ids(&context.partner.id, &context.program.id)
            .await;
        if banned.is_empty() {
            return Ok(RuleOutcome::not_triggered());
        }

        Ok(RuleOutcome::triggered("banned_in_other_program")
            .with_metadata(json!({ "bannedProgramIds": banned })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::ListService;
    use fraudguard_core::EntityRef;
    use fraudguard_repository::{EnrollmentStatus, MemoryRepository, ProgramEnrollment};
    use std::sync::Arc;

    fn ctx(program: &str) -> CrossProgramBanContext {
        CrossProgramBanContext {
            program: EntityRef::new(program),
            partner: EntityRef::new("pn_1"),
        }
    }

    #[tokio::test]
    async fn test_cross_program_ban() {
        let repo = Arc::new(MemoryRepository::new());
        repo.add_enrollment(ProgramEnrollment::new("pn_1", "prog_a", EnrollmentStatus::Banned))
            .await;
        let env = RuleEnv::new(ListService::empty(), repo);

        let elsewhere = PartnerCrossProgramBan
            .evaluate(&ctx("prog_b"), &NoConfig, &env)
            .await
            .unwrap();
        assert_eq!(elsewhere.reason_code.as_deref(), Some("banned_in_other_program"));
        assert_eq!(elsewhere.metadata, Some(json!({ "bannedProgramIds": ["prog_a"] })));

        // a ban in the current program is not a cross-program ban
        let same = PartnerCrossProgramBan
            .evaluate(&ctx("prog_a"), &NoConfig, &env)
            .await
            .unwrap();
        assert!(!same.triggered);
    }
}

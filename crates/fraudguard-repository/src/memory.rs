//! In-memory repository
//!
//! Backs every store trait with process-local maps. Used by tests, demos and
//! embedded deployments that load overrides at startup.

use async_trait::async_trait;
use chrono::Utc;
use fraudguard_core::{FraudEvent, FraudRuleOverride, NewFraudEvent};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::RepositoryError, models::*, traits::*, RepositoryResult,
};

/// Prefix of generated fraud event ids
pub const FRAUD_EVENT_ID_PREFIX: &str = "fre_";

pub(crate) fn generate_event_id() -> String {
    format!("{}{}", FRAUD_EVENT_ID_PREFIX, Uuid::new_v4().simple())
}

/// In-memory repository
#[derive(Default)]
pub struct MemoryRepository {
    /// program_id -> overrides
    overrides: RwLock<HashMap<String, Vec<FraudRuleOverride>>>,
    events: RwLock<Vec<FraudEvent>>,
    enrollments: RwLock<Vec<ProgramEnrollment>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the override for its `(program_id, rule_type)` pair
    pub async fn upsert_override(&self, rule: FraudRuleOverride) {
        let mut overrides = self.overrides.write().await;
        let program = overrides.entry(rule.program_id.clone()).or_default();
        match program.iter_mut().find(|o| o.rule_type == rule.rule_type) {
            Some(existing) => *existing = rule,
            None => program.push(rule),
        }
    }

    /// Insert a new override, rejecting a second one for the same pair
    pub async fn insert_override(&self, rule: FraudRuleOverride) -> RepositoryResult<()> {
        let mut overrides = self.overrides.write().await;
        let program = overrides.entry(rule.program_id.clone()).or_default();
        if program.iter().any(|o| o.rule_type == rule.rule_type) {
            return Err(RepositoryError::DuplicateOverride {
                program_id: rule.program_id,
                rule_type: rule.rule_type.to_string(),
            });
        }
        program.push(rule);
        Ok(())
    }

    pub async fn add_enrollment(&self, enrollment: ProgramEnrollment) {
        let mut enrollments = self.enrollments.write().await;
        enrollments.retain(|e| {
            !(e.partner_id == enrollment.partner_id && e.program_id == enrollment.program_id)
        });
        enrollments.push(enrollment);
    }

    /// Number of stored fraud events
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Every stored fraud event, oldest first
    pub async fn all_events(&self) -> Vec<FraudEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl OverrideRepository for MemoryRepository {
    async fn list_overrides(&self, program_id: &str) -> RepositoryResult<Vec<FraudRuleOverride>> {
        let overrides = self.overrides.read().await;
        Ok(overrides.get(program_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl FraudEventRepository for MemoryRepository {
    async fn create_fraud_event(&self, record: NewFraudEvent) -> RepositoryResult<FraudEvent> {
        let event = FraudEvent::from_new(generate_event_id(), Utc::now(), record);
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn create_fraud_events(&self, records: Vec<NewFraudEvent>) -> RepositoryResult<u64> {
        let now = Utc::now();
        let mut events = self.events.write().await;
        let count = records.len() as u64;
        events.extend(
            records
                .into_iter()
                .map(|record| FraudEvent::from_new(generate_event_id(), now, record)),
        );
        Ok(count)
    }

    async fn list_fraud_events(&self, program_id: &str) -> RepositoryResult<Vec<FraudEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.program_id == program_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryRepository {
    async fn banned_program_ids(
        &self,
        partner_id: &str,
        exclude_program_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        let enrollments = self.enrollments.read().await;
        Ok(enrollments
            .iter()
            .filter(|e| {
                e.partner_id == partner_id
                    && e.program_id != exclude_program_id
                    && e.status == EnrollmentStatus::Banned
            })
            .map(|e| e.program_id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudguard_core::{FraudRuleType, RiskLevel};

    fn new_event(program_id: &str) -> NewFraudEvent {
        NewFraudEvent {
            program_id: program_id.to_string(),
            partner_id: "pn_1".to_string(),
            customer_id: None,
            link_id: None,
            commission_id: None,
            event_id: None,
            risk_level: Some(RiskLevel::Low),
            risk_score: 1,
            triggered_rules: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_override_uniqueness() {
        let repo = MemoryRepository::new();
        let rule = FraudRuleOverride::new("fr_1", "prog_1", FraudRuleType::SelfReferral, RiskLevel::Low);

        repo.insert_override(rule.clone()).await.unwrap();
        let err = repo.insert_override(rule.clone()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DuplicateOverride { .. }));

        repo.upsert_override(FraudRuleOverride {
            risk_level: RiskLevel::High,
            ..rule
        })
        .await;
        let overrides = repo.list_overrides("prog_1").await.unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_unknown_program_has_no_overrides() {
        let repo = MemoryRepository::new();
        assert!(repo.list_overrides("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_single_and_batch() {
        let repo = MemoryRepository::new();

        let event = repo.create_fraud_event(new_event("prog_1")).await.unwrap();
        assert!(event.id.starts_with(FRAUD_EVENT_ID_PREFIX));

        let written = repo
            .create_fraud_events(vec![new_event("prog_1"), new_event("prog_2")])
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(repo.event_count().await, 3);
        assert_eq!(repo.list_fraud_events("prog_1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_banned_program_ids_excludes_current_program() {
        let repo = MemoryRepository::new();
        repo.add_enrollment(ProgramEnrollment::new("pn_1", "prog_1", EnrollmentStatus::Banned))
            .await;
        repo.add_enrollment(ProgramEnrollment::new("pn_1", "prog_2", EnrollmentStatus::Banned))
            .await;
        repo.add_enrollment(ProgramEnrollment::new("pn_1", "prog_3", EnrollmentStatus::Approved))
            .await;

        let banned = repo.banned_program_ids("pn_1", "prog_1").await.unwrap();
        assert_eq!(banned, vec!["prog_2".to_string()]);
    }
}

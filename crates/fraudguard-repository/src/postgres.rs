//! PostgreSQL database repository implementation
//!
//! Expected tables:
//!
//! ```sql
//! CREATE TABLE fraud_rules (
//!     id          TEXT PRIMARY KEY,
//!     program_id  TEXT NOT NULL,
//!     type        TEXT NOT NULL,
//!     risk_level  TEXT NOT NULL,
//!     config      JSONB,
//!     disabled_at TIMESTAMPTZ,
//!     UNIQUE (program_id, type)
//! );
//!
//! CREATE TABLE fraud_events (
//!     id              TEXT PRIMARY KEY,
//!     program_id      TEXT NOT NULL,
//!     partner_id      TEXT NOT NULL,
//!     customer_id     TEXT,
//!     link_id         TEXT,
//!     commission_id   TEXT,
//!     event_id        TEXT,
//!     risk_level      TEXT,
//!     risk_score      INTEGER NOT NULL,
//!     triggered_rules JSONB NOT NULL,
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! -- program_enrollments(partner_id, program_id, status) is owned by the platform
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fraudguard_core::{FraudEvent, FraudRuleOverride, NewFraudEvent, RiskLevel, TriggeredRule};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::memory::generate_event_id;
use crate::{error::RepositoryError, models::*, traits::*, CacheStats, RepositoryResult};

/// PostgreSQL database repository
///
/// Reads overrides (cached) and enrollments, and appends fraud events.
pub struct PostgresRepository {
    /// Database connection pool
    pool: PgPool,
    cache: OverrideCache,
}

impl PostgresRepository {
    /// Create a new PostgreSQL repository
    ///
    /// # Example
    /// ```no_run
    /// use fraudguard_repository::PostgresRepository;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let repo = PostgresRepository::new("postgresql://localhost/fraud").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(database_url: &str) -> RepositoryResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::with_pool(pool))
    }

    /// Create a new PostgreSQL repository with an existing pool
    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            pool,
            cache: OverrideCache::new(CacheConfig::default()),
        }
    }

    /// Replace the override cache configuration
    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = OverrideCache::new(config);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_override(row: &PgRow) -> RepositoryResult<Option<FraudRuleOverride>> {
        let id: String = row.try_get("id")?;
        let program_id: String = row.try_get("program_id")?;
        let raw_type: String = row.try_get("type")?;
        let Some(rule_type) = known_rule_type(&program_id, &id, &raw_type) else {
            return Ok(None);
        };
        let risk_level: String = row.try_get("risk_level")?;

        Ok(Some(FraudRuleOverride {
            id,
            program_id,
            rule_type,
            risk_level: risk_level.parse()?,
            config: row.try_get("config")?,
            disabled_at: row.try_get("disabled_at")?,
        }))
    }

    fn row_to_event(row: &PgRow) -> RepositoryResult<FraudEvent> {
        let risk_level: Option<String> = row.try_get("risk_level")?;
        let risk_level = risk_level
            .map(|level| level.parse::<RiskLevel>())
            .transpose()?;
        let triggered_rules: serde_json::Value = row.try_get("triggered_rules")?;
        let triggered_rules: Vec<TriggeredRule> = serde_json::from_value(triggered_rules)?;
        let risk_score: i32 = row.try_get("risk_score")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(FraudEvent {
            id: row.try_get("id")?,
            program_id: row.try_get("program_id")?,
            partner_id: row.try_get("partner_id")?,
            customer_id: row.try_get("customer_id")?,
            link_id: row.try_get("link_id")?,
            commission_id: row.try_get("commission_id")?,
            event_id: row.try_get("event_id")?,
            risk_level,
            risk_score: u32::try_from(risk_score).map_err(|_| {
                RepositoryError::InvalidRecord(format!("negative risk_score {}", risk_score))
            })?,
            triggered_rules,
            created_at,
        })
    }

    async fn insert_event<'e, E>(executor: E, record: &NewFraudEvent) -> RepositoryResult<FraudEvent>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let id = generate_event_id();
        let triggered_rules = serde_json::to_value(&record.triggered_rules)?;
        let risk_score = i32::try_from(record.risk_score).map_err(|_| {
            RepositoryError::InvalidRecord(format!("risk_score {} overflows", record.risk_score))
        })?;

        let row = sqlx::query(
            r#"
            INSERT INTO fraud_events (
                id, program_id, partner_id, customer_id, link_id, commission_id,
                event_id, risk_level, risk_score, triggered_rules
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&record.program_id)
        .bind(&record.partner_id)
        .bind(record.customer_id.as_deref())
        .bind(record.link_id.as_deref())
        .bind(record.commission_id.as_deref())
        .bind(record.event_id.as_deref())
        .bind(record.risk_level.map(|l| l.as_str()))
        .bind(risk_score)
        .bind(&triggered_rules)
        .fetch_one(executor)
        .await?;

        Self::row_to_event(&row)
    }
}

#[async_trait]
impl OverrideRepository for PostgresRepository {
    async fn list_overrides(&self, program_id: &str) -> RepositoryResult<Vec<FraudRuleOverride>> {
        if let Some(cached) = self.cache.get(program_id) {
            return Ok(cached);
        }

        let rows = sqlx::query(
            "SELECT id, program_id, type, risk_level, config, disabled_at \
             FROM fraud_rules WHERE program_id = $1",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        let overrides: Vec<FraudRuleOverride> = rows
            .iter()
            .map(Self::row_to_override)
            .collect::<RepositoryResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        self.cache.put(program_id, overrides.clone());
        Ok(overrides)
    }
}

#[async_trait]
impl FraudEventRepository for PostgresRepository {
    async fn create_fraud_event(&self, record: NewFraudEvent) -> RepositoryResult<FraudEvent> {
        Self::insert_event(&self.pool, &record).await
    }

    async fn create_fraud_events(&self, records: Vec<NewFraudEvent>) -> RepositoryResult<u64> {
        let mut tx = self.pool.begin().await?;
        for record in &records {
            Self::insert_event(&mut *tx, record).await?;
        }
        tx.commit().await?;
        Ok(records.len() as u64)
    }

    async fn list_fraud_events(&self, program_id: &str) -> RepositoryResult<Vec<FraudEvent>> {
        let rows = sqlx::query(
            "SELECT * FROM fraud_events WHERE program_id = $1 ORDER BY created_at ASC",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_event).collect()
    }
}

#[async_trait]
impl EnrollmentRepository for PostgresRepository {
    async fn banned_program_ids(
        &self,
        partner_id: &str,
        exclude_program_id: &str,
    ) -> RepositoryResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT program_id FROM program_enrollments \
             WHERE partner_id = $1 AND program_id <> $2 AND status = 'banned'",
        )
        .bind(partner_id)
        .bind(exclude_program_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("program_id").map_err(RepositoryError::from))
            .collect()
    }
}

impl CacheableRepository for PostgresRepository {
    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn invalidate(&self, program_id: &str) {
        self.cache.invalidate(program_id);
    }
}

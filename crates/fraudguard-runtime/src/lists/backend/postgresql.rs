//! PostgreSQL-based list backend
//!
//! Default table:
//!
//! ```sql
//! CREATE TABLE list_entries (
//!     list_id    TEXT NOT NULL,
//!     value      TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     expires_at TIMESTAMPTZ,
//!     PRIMARY KEY (list_id, value)
//! );
//! ```

use super::{normalize_entry, ListBackend};
use crate::error::{Result, RuntimeError};
use sqlx::{PgPool, Row};
use std::sync::Arc;

/// PostgreSQL list backend
pub struct PostgresBackend {
    pool: Arc<PgPool>,
    table: String,
    value_column: String,
    expiration_column: Option<String>,
}

impl PostgresBackend {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            table: "list_entries".to_string(),
            value_column: "value".to_string(),
            expiration_column: Some("expires_at".to_string()),
        }
    }

    /// Create a backend reading from a custom table
    ///
    /// Identifiers must be plain `[A-Za-z0-9_]` names; they are interpolated
    /// into the SQL text.
    pub fn new_with_custom_table(
        pool: Arc<PgPool>,
        table: impl Into<String>,
        value_column: impl Into<String>,
        expiration_column: Option<String>,
    ) -> Result<Self> {
        let table = table.into();
        let value_column = value_column.into();
        for ident in [Some(&table), Some(&value_column), expiration_column.as_ref()]
            .into_iter()
            .flatten()
        {
            if ident.is_empty() || !ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(RuntimeError::InvalidOperation(format!(
                    "Invalid SQL identifier: {}",
                    ident
                )));
            }
        }

        Ok(Self {
            pool,
            table,
            value_column,
            expiration_column,
        })
    }

    fn not_expired(&self) -> String {
        match &self.expiration_column {
            Some(col) => format!(" AND ({col} IS NULL OR {col} > NOW())"),
            None => String::new(),
        }
    }

    fn db_error(e: sqlx::Error) -> RuntimeError {
        RuntimeError::Lookup(format!("list query failed: {}", e))
    }
}

#[async_trait::async_trait]
impl ListBackend for PostgresBackend {
    async fn contains(&self, list_id: &str, value: &str) -> Result<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE list_id = $1 AND LOWER({}) = $2{})",
            self.table,
            self.value_column,
            self.not_expired()
        );

        let row = sqlx::query(&query)
            .bind(list_id)
            .bind(normalize_entry(value))
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(Self::db_error)?;

        row.try_get::<bool, _>(0).map_err(Self::db_error)
    }

    async fn add(&self, list_id: &str, value: String) -> Result<()> {
        let query = format!(
            "INSERT INTO {} (list_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.table, self.value_column
        );

        sqlx::query(&query)
            .bind(list_id)
            .bind(normalize_entry(&value))
            .execute(self.pool.as_ref())
            .await
            .map_err(Self::db_error)?;
        Ok(())
    }

    async fn remove(&self, list_id: &str, value: &str) -> Result<()> {
        let query = format!(
            "DELETE FROM {} WHERE list_id = $1 AND LOWER({}) = $2",
            self.table, self.value_column
        );

        sqlx::query(&query)
            .bind(list_id)
            .bind(normalize_entry(value))
            .execute(self.pool.as_ref())
            .await
            .map_err(Self::db_error)?;
        Ok(())
    }

    async fn get_all(&self, list_id: &str) -> Result<Vec<String>> {
        let query = format!(
            "SELECT {} FROM {} WHERE list_id = $1{}",
            self.value_column,
            self.table,
            self.not_expired()
        );

        let rows = sqlx::query(&query)
            .bind(list_id)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(Self::db_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(Self::db_error))
            .collect()
    }
}

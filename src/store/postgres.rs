//! PostgreSQL record store over the `telemetry_events` table.

use super::{PendingPolicy, PendingRecord, RecordId, RecordStore, StoreError};
use crate::config::StoreConfig;
use crate::pricing::AggregatedCost;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// Record store backed by the collector's PostgreSQL database.
pub struct PostgresStore {
    pool: PgPool,
    policy: PendingPolicy,
    table_name: String,
}

impl PostgresStore {
    /// Connect a pool using the store configuration.
    pub async fn connect(
        database_url: &str,
        config: &StoreConfig,
        policy: PendingPolicy,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(database_url)
            .await?;
        Ok(Self::with_pool(pool, policy).with_table_name(&config.table_name))
    }

    /// Create with an existing connection pool.
    pub fn with_pool(pool: PgPool, policy: PendingPolicy) -> Self {
        Self {
            pool,
            policy,
            table_name: "telemetry_events".to_string(),
        }
    }

    /// Set custom table name.
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Add the reconciliation columns and the pending index if missing.
    ///
    /// The table itself belongs to the collector and must already exist. The
    /// index is built concurrently so inserts keep flowing during the build.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in migration_statements(&self.table_name) {
            // Simple protocol: CONCURRENTLY is rejected inside a transaction block
            sqlx::raw_sql(&statement).execute(&self.pool).await?;
        }
        tracing::info!(table = %self.table_name, "Record store schema is up to date");
        Ok(())
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Record store connection pool closed");
    }
}

fn migration_statements(table: &str) -> Vec<String> {
    vec![
        format!(
            "ALTER TABLE {table}
                ADD COLUMN IF NOT EXISTS generation_id TEXT,
                ADD COLUMN IF NOT EXISTS cost DOUBLE PRECISION,
                ADD COLUMN IF NOT EXISTS prompt_tokens BIGINT,
                ADD COLUMN IF NOT EXISTS completion_tokens BIGINT,
                ADD COLUMN IF NOT EXISTS cached_tokens BIGINT,
                ADD COLUMN IF NOT EXISTS reasoning_tokens BIGINT,
                ADD COLUMN IF NOT EXISTS cost_fetch_retries INTEGER"
        ),
        format!(
            "CREATE INDEX CONCURRENTLY IF NOT EXISTS idx_{table}_cost_pending ON {table} (created_at)
                WHERE cost IS NULL AND generation_id IS NOT NULL"
        ),
    ]
}

fn pending_query(table: &str) -> String {
    format!(
        "SELECT id, generation_id, COALESCE(cost_fetch_retries, 0) AS retry_count, created_at
         FROM {table}
         WHERE generation_id IS NOT NULL
           AND cost IS NULL
           AND COALESCE(cost_fetch_retries, 0) < $1
           AND created_at > $2
         ORDER BY created_at ASC, id ASC
         LIMIT $3"
    )
}

fn apply_cost_query(table: &str) -> String {
    format!(
        "UPDATE {table}
         SET cost = $2,
             prompt_tokens = $3,
             completion_tokens = $4,
             cached_tokens = $5,
             reasoning_tokens = $6
         WHERE id = $1"
    )
}

fn increment_retry_query(table: &str) -> String {
    format!(
        "UPDATE {table}
         SET cost_fetch_retries = COALESCE(cost_fetch_retries, 0) + 1
         WHERE id = $1
         RETURNING cost_fetch_retries"
    )
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl RecordStore for PostgresStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn fetch_pending(&self, limit: usize) -> Result<Vec<PendingRecord>, StoreError> {
        let cutoff = self.policy.cutoff(Utc::now());
        let max_retries = i32::try_from(self.policy.max_retries).unwrap_or(i32::MAX);

        let rows = sqlx::query(&pending_query(&self.table_name))
            .bind(max_retries)
            .bind(cutoff)
            .bind(to_i64(limit as u64))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<PendingRecord, StoreError> {
                let id: i64 = row.try_get("id")?;
                let generation_id: String = row.try_get("generation_id")?;
                let retry_count: i32 = row.try_get("retry_count")?;
                let created_at: DateTime<Utc> = row.try_get("created_at")?;
                Ok(PendingRecord::from_stored(
                    id,
                    &generation_id,
                    retry_count.max(0) as u32,
                    created_at,
                ))
            })
            .collect()
    }

    async fn apply_cost(&self, id: RecordId, cost: &AggregatedCost) -> Result<(), StoreError> {
        let result = sqlx::query(&apply_cost_query(&self.table_name))
            .bind(id)
            .bind(cost.total_cost)
            .bind(to_i64(cost.tokens.prompt))
            .bind(to_i64(cost.tokens.completion))
            .bind(to_i64(cost.tokens.cached))
            .bind(to_i64(cost.tokens.reasoning))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn increment_retry(&self, id: RecordId) -> Result<u32, StoreError> {
        let row = sqlx::query(&increment_retry_query(&self.table_name))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let retries: i32 = row.try_get("cost_fetch_retries")?;
        Ok(retries.max(0) as u32)
    }
}

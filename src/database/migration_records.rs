use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashSet;

use crate::database::models::{MigrationRecord, MigrationStatus};
use crate::database::StoreError;

/// Persistence seam for migration execution records
#[async_trait]
pub trait MigrationStore: Send + Sync {
    /// Versions already marked success
    async fn successful_versions(&self) -> Result<HashSet<String>, StoreError>;

    async fn find(&self, version: &str) -> Result<Option<MigrationRecord>, StoreError>;

    /// Insert or replace the record for this version. Replacement happens
    /// when a previously failed version is retried on a later run.
    async fn insert(&self, record: &MigrationRecord) -> Result<(), StoreError>;

    async fn set_status(&self, version: &str, status: MigrationStatus) -> Result<(), StoreError>;

    async fn delete(&self, version: &str) -> Result<(), StoreError>;

    /// All records ordered ascending by version
    async fn list(&self) -> Result<Vec<MigrationRecord>, StoreError>;
}

/// Postgres-backed migration record store
pub struct PgMigrationStore {
    pool: PgPool,
}

type RecordRow = (String, String, DateTime<Utc>, String);

impl PgMigrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bootstrap the records table itself; the runner needs it before any
    /// migration unit has ever executed.
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS migrations (\
                version TEXT PRIMARY KEY, \
                name TEXT NOT NULL, \
                executed_at TIMESTAMPTZ NOT NULL, \
                status TEXT NOT NULL\
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn from_row((version, name, executed_at, status): RecordRow) -> Result<MigrationRecord, StoreError> {
        let status = MigrationStatus::parse(&status).ok_or_else(|| {
            StoreError::Unavailable(format!("unknown migration status '{}'", status))
        })?;
        Ok(MigrationRecord {
            version,
            name,
            executed_at,
            status,
        })
    }
}

#[async_trait]
impl MigrationStore for PgMigrationStore {
    async fn successful_versions(&self) -> Result<HashSet<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT version FROM migrations WHERE status = 'success'")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(v,)| v).collect())
    }

    async fn find(&self, version: &str) -> Result<Option<MigrationRecord>, StoreError> {
        let row: Option<RecordRow> = sqlx::query_as(
            "SELECT version, name, executed_at, status FROM migrations WHERE version = $1",
        )
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::from_row).transpose()
    }

    async fn insert(&self, record: &MigrationRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO migrations (version, name, executed_at, status) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (version) DO UPDATE SET \
                name = EXCLUDED.name, executed_at = EXCLUDED.executed_at, status = EXCLUDED.status",
        )
        .bind(&record.version)
        .bind(&record.name)
        .bind(record.executed_at)
        .bind(record.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(&self, version: &str, status: MigrationStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE migrations SET status = $2 WHERE version = $1")
            .bind(version)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, version: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM migrations WHERE version = $1")
            .bind(version)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<MigrationRecord>, StoreError> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT version, name, executed_at, status FROM migrations ORDER BY version ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::from_row).collect()
    }
}

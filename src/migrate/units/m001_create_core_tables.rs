use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::migrate::MigrationUnit;

/// Base schema: users, articles, and the per-user view history documents
pub struct CreateCoreTables {
    pool: PgPool,
}

impl CreateCoreTables {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationUnit for CreateCoreTables {
    fn version(&self) -> &str {
        "001_create_core_tables"
    }

    fn name(&self) -> &str {
        "001_create_core_tables.sql"
    }

    async fn apply(&self) -> anyhow::Result<()> {
        info!("Creating core tables");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (\
                id UUID PRIMARY KEY, \
                user_name TEXT NOT NULL UNIQUE, \
                full_name TEXT NOT NULL, \
                email TEXT NOT NULL UNIQUE, \
                password_hash TEXT NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()\
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS articles (\
                id UUID PRIMARY KEY, \
                author_id UUID NOT NULL REFERENCES users(id), \
                document_type TEXT NOT NULL, \
                title TEXT NOT NULL UNIQUE, \
                summary TEXT NOT NULL, \
                content JSONB NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()\
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_view_history (\
                user_id UUID PRIMARY KEY, \
                recently_viewed JSONB NOT NULL DEFAULT '[]'::jsonb\
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn has_rollback(&self) -> bool {
        true
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        info!("Dropping core tables");

        sqlx::query("DROP TABLE IF EXISTS user_view_history")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS articles")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS users")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

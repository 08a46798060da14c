use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::migrate::MigrationUnit;

/// Adds the views counter to existing articles
pub struct AddArticleViewsField {
    pool: PgPool,
}

impl AddArticleViewsField {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationUnit for AddArticleViewsField {
    fn version(&self) -> &str {
        "002_add_article_views_field"
    }

    fn name(&self) -> &str {
        "002_add_article_views_field.sql"
    }

    async fn apply(&self) -> anyhow::Result<()> {
        info!("Adding views field to articles");

        sqlx::query("ALTER TABLE articles ADD COLUMN IF NOT EXISTS views BIGINT NOT NULL DEFAULT 0")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn has_rollback(&self) -> bool {
        true
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        info!("Removing views field from articles");

        sqlx::query("ALTER TABLE articles DROP COLUMN IF EXISTS views")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Article, ArticleProjection, AuthorProjection};
use crate::database::StoreError;

/// Read-only article resolution consumed by the recently-viewed tracker.
/// Ids whose article no longer exists are simply absent from the result.
#[async_trait]
pub trait ArticleLookup: Send + Sync {
    async fn projections(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ArticleProjection>, StoreError>;
}

/// Postgres-backed article store: CRUD for handlers plus the lookup seam
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        document_type: &str,
        title: &str,
        summary: &str,
        content: Value,
    ) -> Result<Article, StoreError> {
        let article = sqlx::query_as::<_, Article>(
            "INSERT INTO articles (id, author_id, document_type, title, summary, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now(), now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(document_type)
        .bind(title)
        .bind(summary)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(article)
    }

    pub async fn exists_by_title(&self, title: &str) -> Result<bool, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles WHERE title = $1")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }

    /// All articles with their author projection, newest first, as API-shaped
    /// JSON rows built in the database
    pub async fn list_with_authors(&self) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT a.id, a.document_type, a.title, a.summary, a.content, a.views, \
                       a.created_at, a.updated_at, \
                       json_build_object('user_name', u.user_name, 'full_name', u.full_name, 'email', u.email) AS author \
                FROM articles a JOIN users u ON u.id = a.author_id \
                ORDER BY a.created_at DESC\
             ) t",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_get("row").unwrap_or(Value::Null))
            .collect())
    }

    /// Single article with author projection, same shape as the listing
    pub async fn find_with_author(&self, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT a.id, a.document_type, a.title, a.summary, a.content, a.views, \
                       a.created_at, a.updated_at, \
                       json_build_object('user_name', u.user_name, 'full_name', u.full_name, 'email', u.email) AS author \
                FROM articles a JOIN users u ON u.id = a.author_id \
                WHERE a.id = $1\
             ) t",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.try_get("row").unwrap_or(Value::Null)))
    }

    /// Partial update; None fields keep their current value
    pub async fn update(
        &self,
        id: Uuid,
        document_type: Option<&str>,
        title: Option<&str>,
        summary: Option<&str>,
        content: Option<Value>,
    ) -> Result<Article, StoreError> {
        let article = sqlx::query_as::<_, Article>(
            "UPDATE articles SET \
                document_type = COALESCE($2, document_type), \
                title = COALESCE($3, title), \
                summary = COALESCE($4, summary), \
                content = COALESCE($5, content), \
                updated_at = now() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(document_type)
        .bind(title)
        .bind(summary)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleLookup for PgArticleStore {
    async fn projections(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ArticleProjection>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            "SELECT a.id, a.title, a.summary, a.document_type, a.created_at, \
                    u.user_name, u.full_name \
             FROM articles a JOIN users u ON u.id = a.author_id \
             WHERE a.id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut projections = HashMap::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            projections.insert(
                id,
                ArticleProjection {
                    id,
                    title: row.try_get("title")?,
                    summary: row.try_get("summary")?,
                    document_type: row.try_get("document_type")?,
                    author: AuthorProjection {
                        user_name: row.try_get("user_name")?,
                        full_name: row.try_get("full_name")?,
                    },
                    created_at: row.try_get("created_at")?,
                },
            );
        }
        Ok(projections)
    }
}

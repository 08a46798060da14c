use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{UserViewHistory, ViewRecord};
use crate::database::StoreError;

/// Persistence seam for per-user view history documents.
///
/// `record_view` is deliberately the whole load-or-create / dedup / push-front /
/// truncate / save sequence as a single store operation, so that concurrent
/// view events for the same user serialize at the store instead of racing
/// through a read-modify-write in application code.
#[async_trait]
pub trait ViewHistoryStore: Send + Sync {
    async fn record_view(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn load(&self, user_id: Uuid) -> Result<Option<UserViewHistory>, StoreError>;
}

/// Postgres-backed store keeping each history as one JSONB document row
pub struct PgViewHistoryStore {
    pool: PgPool,
}

impl PgViewHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewHistoryStore for PgViewHistoryStore {
    async fn record_view(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent view events for the same user
        let existing: Option<(Value,)> = sqlx::query_as(
            "SELECT recently_viewed FROM user_view_history WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut history = match existing {
            Some((doc,)) => UserViewHistory {
                user_id,
                recently_viewed: serde_json::from_value::<Vec<ViewRecord>>(doc)?,
            },
            None => UserViewHistory::new(user_id),
        };
        history.push_view(article_id, viewed_at);

        sqlx::query(
            "INSERT INTO user_view_history (user_id, recently_viewed) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET recently_viewed = EXCLUDED.recently_viewed",
        )
        .bind(user_id)
        .bind(serde_json::to_value(&history.recently_viewed)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load(&self, user_id: Uuid) -> Result<Option<UserViewHistory>, StoreError> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT recently_viewed FROM user_view_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((doc,)) => Ok(Some(UserViewHistory {
                user_id,
                recently_viewed: serde_json::from_value(doc)?,
            })),
            None => Ok(None),
        }
    }
}

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::StoreError;

/// Postgres-backed user store for signup/signin
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_name: &str,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, user_name, full_name, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_name)
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Duplicate check used at signup; matches either unique field
    pub async fn exists_by_email_or_user_name(
        &self,
        email: &str,
        user_name: &str,
    ) -> Result<bool, StoreError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1 OR user_name = $2")
                .bind(email)
                .bind(user_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }
}

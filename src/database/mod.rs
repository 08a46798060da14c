pub mod articles;
pub mod manager;
pub mod migration_records;
pub mod models;
pub mod users;
pub mod view_history;

use thiserror::Error;

/// Errors from the persistence layer, shared by all stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("corrupt stored document: {0}")]
    CorruptDocument(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

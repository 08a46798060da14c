use axum::{extract::Path, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::articles::PgArticleStore;
use crate::database::manager::DatabaseManager;
use crate::database::models::{ArticleContent, DocumentType};
use crate::database::view_history::PgViewHistoryStore;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::RecentlyViewedTracker;

#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub document_type: String,
    pub title: String,
    pub summary: String,
    pub content: ArticleContent,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub document_type: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<ArticleContent>,
}

async fn article_store() -> Result<PgArticleStore, ApiError> {
    Ok(PgArticleStore::new(DatabaseManager::pool().await?))
}

fn parse_article_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("Invalid article ID"))
}

/// POST /api/v1/articles - create article (author = authenticated user)
pub async fn article_create(
    user: AuthUser,
    Json(body): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.title.is_empty() || body.summary.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }
    let document_type = DocumentType::parse(&body.document_type)
        .ok_or_else(|| ApiError::bad_request("Invalid document type"))?;

    let store = article_store().await?;

    // Titles are stored lowercased and must be unique
    let title = body.title.to_lowercase();
    if store.exists_by_title(&title).await? {
        return Err(ApiError::bad_request(
            "Article with this title already exists",
        ));
    }

    let content = serde_json::to_value(&body.content)
        .map_err(|_| ApiError::bad_request("Invalid content"))?;
    let article = store
        .create(
            user.user_id,
            document_type.as_str(),
            &title,
            &body.summary,
            content,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Article created successfully",
            "article": article
        })),
    ))
}

/// GET /api/v1/articles - list all articles with author projection (public)
pub async fn article_list() -> Result<Json<Value>, ApiError> {
    let store = article_store().await?;
    let articles = store.list_with_authors().await?;

    Ok(Json(json!({
        "success": true,
        "count": articles.len(),
        "data": articles
    })))
}

/// GET /api/v1/articles/:id - fetch one article and record the view.
/// View tracking is best-effort and never fails the read.
pub async fn article_get(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_article_id(&id)?;
    let pool = DatabaseManager::pool().await?;
    let store = PgArticleStore::new(pool.clone());

    let article = store
        .find_with_author(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;

    let tracker = RecentlyViewedTracker::new(
        PgViewHistoryStore::new(pool.clone()),
        PgArticleStore::new(pool),
    );
    tracker.record_view(user.user_id, id).await;

    Ok(Json(json!({
        "success": true,
        "data": article
    })))
}

/// GET /api/v1/articles/recently-viewed - the authenticated user's history
pub async fn recently_viewed_get(user: AuthUser) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let tracker = RecentlyViewedTracker::new(
        PgViewHistoryStore::new(pool.clone()),
        PgArticleStore::new(pool),
    );

    let entries = tracker
        .list_recently_viewed(&user.user_id.to_string())
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": entries.len(),
        "data": entries
    })))
}

/// PUT /api/v1/articles/:id - partial update, author only
pub async fn article_put(
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateArticleRequest>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_article_id(&id)?;
    let store = article_store().await?;

    let article = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    if article.author_id != user.user_id {
        return Err(ApiError::forbidden("You can only update your own articles"));
    }

    let document_type = match body.document_type.as_deref() {
        Some(s) => Some(
            DocumentType::parse(s)
                .ok_or_else(|| ApiError::bad_request("Invalid document type"))?,
        ),
        None => None,
    };
    let title = body.title.map(|t| t.to_lowercase());
    if let Some(title) = title.as_deref() {
        if title != article.title && store.exists_by_title(title).await? {
            return Err(ApiError::bad_request(
                "Article with this title already exists",
            ));
        }
    }
    let content = match body.content {
        Some(c) => Some(
            serde_json::to_value(&c).map_err(|_| ApiError::bad_request("Invalid content"))?,
        ),
        None => None,
    };

    let updated = store
        .update(
            id,
            document_type.map(|d| d.as_str()),
            title.as_deref(),
            body.summary.as_deref(),
            content,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Article updated successfully",
        "article": updated
    })))
}

/// DELETE /api/v1/articles/:id - author only
pub async fn article_delete(
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_article_id(&id)?;
    let store = article_store().await?;

    let article = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    if article.author_id != user.user_id {
        return Err(ApiError::forbidden(
            "You are not allowed to delete this article.",
        ));
    }

    store.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Article deleted successfully"
    })))
}

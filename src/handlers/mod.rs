pub mod articles;
pub mod auth;

use axum::{routing::get, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(article_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    Router::new()
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/signin", post(auth::signin))
}

fn article_routes() -> Router {
    // Handlers taking an AuthUser extractor are protected; the listing is public
    Router::new()
        .route(
            "/api/v1/articles",
            get(articles::article_list).post(articles::article_create),
        )
        .route(
            "/api/v1/articles/recently-viewed",
            get(articles::recently_viewed_get),
        )
        .route(
            "/api/v1/articles/:id",
            get(articles::article_get)
                .put(articles::article_put)
                .delete(articles::article_delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Finsight API",
            "version": version,
            "description": "Financial-analysis article API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/v1/auth/signup, /api/v1/auth/signin (public)",
                "articles": "/api/v1/articles[/:id] (GET list public, rest protected)",
                "recently_viewed": "/api/v1/articles/recently-viewed (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

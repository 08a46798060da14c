use axum::{http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::users::PgUserStore;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/signup - create a new user account
pub async fn signup(
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.user_name.is_empty()
        || body.full_name.is_empty()
        || body.email.is_empty()
        || body.password.is_empty()
        || body.confirm_password.is_empty()
    {
        return Err(ApiError::bad_request("All fields are required."));
    }
    if body.password != body.confirm_password {
        return Err(ApiError::bad_request("Passwords should be same."));
    }

    let pool = DatabaseManager::pool().await?;
    let users = PgUserStore::new(pool);

    if users
        .exists_by_email_or_user_name(&body.email, &body.user_name)
        .await?
    {
        return Err(ApiError::bad_request(
            "User already exists with this email or user name.",
        ));
    }

    let password_hash = hash_password(&body.password);
    let user = users
        .create(&body.user_name, &body.full_name, &body.email, &password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully.",
            "user": user
        })),
    ))
}

/// POST /api/v1/auth/signin - verify credentials and issue a JWT
pub async fn signin(
    Json(body): Json<SigninRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let pool = DatabaseManager::pool().await?;
    let users = PgUserStore::new(pool);

    let user = users
        .find_by_email(&body.email)
        .await?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(ApiError::bad_request("Invalid password"));
    }

    let token = generate_jwt(Claims::new(user.id)).map_err(|e| {
        tracing::error!("JWT generation failed: {}", e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "token": token,
            "user": user
        })),
    ))
}

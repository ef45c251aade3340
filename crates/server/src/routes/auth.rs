use std::sync::LazyLock;

use axum::{Extension, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::{jwt, middleware::AuthUser, password};
use crate::config::Config;
use crate::db::users;
use crate::error::AppError;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("username pattern compiles"));

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3-20 characters"),
        regex(path = *USERNAME_RE, message = "Username can only contain letters, numbers, and underscores")
    )]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(alias = "chesscomUsername")]
    pub chess_com_username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChessComRequest {
    #[serde(alias = "chesscomUsername")]
    #[validate(length(min = 1, message = "Chess.com username required"))]
    pub chess_com_username: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub chess_com_username: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

impl From<&users::User> for UserResponse {
    fn from(u: &users::User) -> Self {
        UserResponse {
            id: u.id,
            username: u.username.clone(),
            chess_com_username: u.chess_com_username.clone(),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

impl From<&AuthUser> for UserResponse {
    fn from(u: &AuthUser) -> Self {
        UserResponse {
            id: u.id,
            username: u.username.clone(),
            chess_com_username: u.chess_com_username.clone(),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

fn issue_token(user_id: i64, config: &Config) -> Result<String, AppError> {
    Ok(jwt::create_token(user_id, &config.jwt_secret, config.jwt_expire_hours)?)
}

/// POST /api/auth/register
pub async fn register(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Config>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    if users::username_exists(&pool, &req.username).await? {
        return Err(AppError::BadRequest("Username already taken".into()));
    }

    let hash = password::hash_password(&req.password)?;

    let chess_com = req
        .chess_com_username
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let user = users::create_user(&pool, &req.username, &hash, chess_com).await?;
    tracing::info!(user_id = user.id, username = %user.username, "Registered user");

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        token: issue_token(user.id, &config)?,
    }))
}

/// POST /api/auth/login
pub async fn login(
    Extension(pool): Extension<PgPool>,
    Extension(config): Extension<Config>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = users::get_user_by_username(&pool, &req.username)
        .await?
        .ok_or(AppError::BadRequest("Invalid username or password".into()))?;

    let verified = password::verify_password(&req.password, &user.password_hash)?;
    if !verified.is_valid() {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    // bcrypt -> argon2 on successful login
    if verified == password::Verified::Legacy {
        if let Ok(new_hash) = password::hash_password(&req.password) {
            if let Err(e) = users::update_password_hash(&pool, user.id, &new_hash).await {
                tracing::warn!(user_id = user.id, error = %e, "Failed to rehash legacy password");
            }
        }
    }

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        token: issue_token(user.id, &config)?,
    }))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// PUT /api/auth/password
pub async fn update_password(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<JsonValue>, AppError> {
    req.validate()?;

    let hash = password::hash_password(&req.new_password)?;

    if !users::update_password_hash(&pool, user.id, &hash).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// PUT /api/auth/chess-com
pub async fn update_chess_com(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(req): Json<UpdateChessComRequest>,
) -> Result<Json<JsonValue>, AppError> {
    req.validate()?;

    let updated = users::update_chess_com_username(&pool, user.id, req.chess_com_username.trim()).await?;
    Ok(Json(json!({
        "message": "Chess.com username updated",
        "chessComUsername": updated,
    })))
}

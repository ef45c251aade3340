use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::mistakes::{self, MistakeRow};
use crate::db::notes;
use crate::error::AppError;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveMistakesRequest {
    pub player_color: String,
    #[validate(range(min = 0.0, message = "threshold must not be negative"))]
    pub threshold: f64,
    #[serde(default)]
    pub flagged_move_sequences: Vec<String>,
    #[serde(default)]
    pub move_error_details: Vec<JsonValue>,
    #[serde(default)]
    pub skipped_plies: i32,
}

/// GET /api/notes/{id}/mistakes
pub async fn get_mistakes(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
) -> Result<Json<MistakeRow>, AppError> {
    notes::get_note(&pool, user.id, note_id).await?;
    mistakes::get_mistakes(&pool, note_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No mistake report for this note".into()))
}

/// POST /api/notes/{id}/mistakes
pub async fn save_mistakes(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
    Json(req): Json<SaveMistakesRequest>,
) -> Result<Json<MistakeRow>, AppError> {
    req.validate()?;
    let color = req.player_color.to_ascii_lowercase();
    if color != "white" && color != "black" {
        return Err(AppError::BadRequest("playerColor must be white or black".into()));
    }
    notes::get_note(&pool, user.id, note_id).await?;

    let row = mistakes::save_mistakes(
        &pool,
        note_id,
        &color,
        req.threshold,
        &serde_json::to_value(&req.flagged_move_sequences).map_err(anyhow::Error::from)?,
        &JsonValue::Array(req.move_error_details),
        req.skipped_plies,
    )
    .await?;
    Ok(Json(row))
}

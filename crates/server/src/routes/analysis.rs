use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::analysis::{self, MoveAnalysis};
use crate::db::notes;
use crate::error::AppError;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisRequest {
    pub note_id: i64,
    /// SAN moves from the start joined by spaces, e.g. `e4 e5 Nf3`.
    #[validate(length(min = 1, message = "movePath is required"))]
    pub move_path: String,
    #[validate(length(min = 1, message = "fen is required"))]
    pub fen: String,
    pub analysis: JsonValue,
    #[serde(alias = "chatgptAnalysis")]
    pub ai_analysis: Option<String>,
}

/// POST /api/analysis
pub async fn save_analysis(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(req): Json<SaveAnalysisRequest>,
) -> Result<Json<MoveAnalysis>, AppError> {
    req.validate()?;
    notes::get_note(&pool, user.id, req.note_id).await?;

    let saved = analysis::save_move_analysis(
        &pool,
        req.note_id,
        req.move_path.trim(),
        req.fen.trim(),
        &req.analysis,
        req.ai_analysis.as_deref(),
    )
    .await?;
    Ok(Json(saved))
}

/// GET /api/analysis/{note_id}
pub async fn get_all_analyses(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
) -> Result<Json<Vec<MoveAnalysis>>, AppError> {
    notes::get_note(&pool, user.id, note_id).await?;
    Ok(Json(analysis::get_all_move_analyses(&pool, note_id).await?))
}

/// GET /api/analysis/{note_id}/{move_path}
pub async fn get_analysis(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path((note_id, move_path)): Path<(i64, String)>,
) -> Result<Json<MoveAnalysis>, AppError> {
    notes::get_note(&pool, user.id, note_id).await?;
    analysis::get_move_analysis(&pool, note_id, move_path.trim())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Analysis not found".into()))
}

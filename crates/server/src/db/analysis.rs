use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAnalysis {
    pub note_id: i64,
    pub move_path: String,
    pub fen: String,
    pub analysis: JsonValue,
    pub ai_analysis: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

const ANALYSIS_COLUMNS: &str = "note_id, move_path, fen, analysis, ai_analysis, updated_at";

/// Insert or replace the analysis stored for one move of a note.
pub async fn save_move_analysis(
    pool: &PgPool,
    note_id: i64,
    move_path: &str,
    fen: &str,
    analysis: &JsonValue,
    ai_analysis: Option<&str>,
) -> Result<MoveAnalysis, AppError> {
    sqlx::query_as::<_, MoveAnalysis>(&format!(
        r#"INSERT INTO move_analysis (note_id, move_path, fen, analysis, ai_analysis)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (note_id, move_path) DO UPDATE SET
            fen = EXCLUDED.fen,
            analysis = EXCLUDED.analysis,
            ai_analysis = COALESCE(EXCLUDED.ai_analysis, move_analysis.ai_analysis),
            updated_at = NOW()
        RETURNING {ANALYSIS_COLUMNS}"#
    ))
    .bind(note_id)
    .bind(move_path)
    .bind(fen)
    .bind(analysis)
    .bind(ai_analysis)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn get_move_analysis(
    pool: &PgPool,
    note_id: i64,
    move_path: &str,
) -> Result<Option<MoveAnalysis>, AppError> {
    sqlx::query_as::<_, MoveAnalysis>(&format!(
        "SELECT {ANALYSIS_COLUMNS} FROM move_analysis WHERE note_id = $1 AND move_path = $2"
    ))
    .bind(note_id)
    .bind(move_path)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn get_all_move_analyses(pool: &PgPool, note_id: i64) -> Result<Vec<MoveAnalysis>, AppError> {
    sqlx::query_as::<_, MoveAnalysis>(&format!(
        "SELECT {ANALYSIS_COLUMNS} FROM move_analysis WHERE note_id = $1 ORDER BY id"
    ))
    .bind(note_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

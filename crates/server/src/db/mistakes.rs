use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeRow {
    pub note_id: i64,
    pub player_color: String,
    pub threshold: f64,
    pub flagged_sequences: JsonValue,
    pub details: JsonValue,
    pub skipped_plies: i32,
    pub analyzed_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_mistakes(pool: &PgPool, note_id: i64) -> Result<Option<MistakeRow>, AppError> {
    sqlx::query_as::<_, MistakeRow>(
        r#"SELECT note_id, player_color, threshold, flagged_sequences, details, skipped_plies, analyzed_at
        FROM note_mistakes WHERE note_id = $1"#,
    )
    .bind(note_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn save_mistakes(
    pool: &PgPool,
    note_id: i64,
    player_color: &str,
    threshold: f64,
    flagged_sequences: &JsonValue,
    details: &JsonValue,
    skipped_plies: i32,
) -> Result<MistakeRow, AppError> {
    sqlx::query_as::<_, MistakeRow>(
        r#"INSERT INTO note_mistakes (
            note_id, player_color, threshold, flagged_sequences, details, skipped_plies, analyzed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (note_id) DO UPDATE SET
            player_color = EXCLUDED.player_color,
            threshold = EXCLUDED.threshold,
            flagged_sequences = EXCLUDED.flagged_sequences,
            details = EXCLUDED.details,
            skipped_plies = EXCLUDED.skipped_plies,
            analyzed_at = NOW()
        RETURNING note_id, player_color, threshold, flagged_sequences, details, skipped_plies, analyzed_at"#,
    )
    .bind(note_id)
    .bind(player_color)
    .bind(threshold)
    .bind(flagged_sequences)
    .bind(details)
    .bind(skipped_plies)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}

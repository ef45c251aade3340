//! Database queries for note fetching and mistake report storage

use sqlx::PgPool;

use crate::error::WorkerError;
use crate::mistakes::MistakeReport;

/// Note data needed for analysis
#[derive(Debug, sqlx::FromRow)]
pub struct NoteRow {
    pub id: i64,
    pub title: String,
    pub pgn: String,
}

pub async fn fetch_note(pool: &PgPool, note_id: i64) -> Result<NoteRow, WorkerError> {
    sqlx::query_as::<_, NoteRow>("SELECT id, title, pgn FROM notes WHERE id = $1")
        .bind(note_id)
        .fetch_optional(pool)
        .await?
        .ok_or(WorkerError::NoteNotFound(note_id))
}

/// Replace the stored report for a note.
pub async fn save_mistakes(
    pool: &PgPool,
    note_id: i64,
    player_color: &str,
    threshold: f64,
    report: &MistakeReport,
) -> Result<(), WorkerError> {
    let flagged = serde_json::to_value(&report.flagged_move_sequences)?;
    let details = serde_json::to_value(&report.move_error_details)?;

    sqlx::query(
        r#"INSERT INTO note_mistakes (
            note_id, player_color, threshold, flagged_sequences, details, skipped_plies, analyzed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (note_id) DO UPDATE SET
            player_color = EXCLUDED.player_color,
            threshold = EXCLUDED.threshold,
            flagged_sequences = EXCLUDED.flagged_sequences,
            details = EXCLUDED.details,
            skipped_plies = EXCLUDED.skipped_plies,
            analyzed_at = NOW()"#,
    )
    .bind(note_id)
    .bind(player_color)
    .bind(threshold)
    .bind(&flagged)
    .bind(&details)
    .bind(report.skipped_plies as i32)
    .execute(pool)
    .await?;

    Ok(())
}

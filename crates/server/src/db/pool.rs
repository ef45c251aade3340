use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Create every table the service needs. Safe to run on each start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                 BIGSERIAL PRIMARY KEY,
    username           TEXT UNIQUE NOT NULL,
    password_hash      TEXT NOT NULL,
    chess_com_username TEXT,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_users_username_lower
    ON users (LOWER(username));

-- One annotated game per note, stored as PGN text
CREATE TABLE IF NOT EXISTS notes (
    id            BIGSERIAL PRIMARY KEY,
    user_id       BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    pgn           TEXT NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    last_modified TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_notes_user_id
    ON notes (user_id, last_modified DESC);

-- Per-move analysis keyed by the SAN sequence leading to the move
CREATE TABLE IF NOT EXISTS move_analysis (
    id                BIGSERIAL PRIMARY KEY,
    note_id           BIGINT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
    move_path         TEXT NOT NULL,
    fen               TEXT NOT NULL,
    analysis          JSONB NOT NULL,
    ai_analysis       TEXT,
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE(note_id, move_path)
);

-- Latest mistake report per note
CREATE TABLE IF NOT EXISTS note_mistakes (
    note_id           BIGINT PRIMARY KEY REFERENCES notes(id) ON DELETE CASCADE,
    player_color      TEXT NOT NULL,
    threshold         DOUBLE PRECISION NOT NULL,
    flagged_sequences JSONB NOT NULL,
    details           JSONB NOT NULL,
    skipped_plies     INTEGER NOT NULL DEFAULT 0,
    analyzed_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create every table and index on an open pool. Idempotent.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ministries (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            acronym TEXT UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            summary TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per sitting day
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            date TEXT NOT NULL UNIQUE,
            sitting_no INTEGER,
            parliament INTEGER,
            session_no INTEGER,
            volume_no INTEGER,
            format TEXT,
            url TEXT,
            summary TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bills (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE,
            ministry_id TEXT REFERENCES ministries(id),
            first_reading_date TEXT,
            first_reading_session_id TEXT REFERENCES sessions(id),
            second_reading_date TEXT,
            second_reading_session_id TEXT REFERENCES sessions(id),
            summary TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sections (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(id),
            ministry_id TEXT REFERENCES ministries(id),
            bill_id TEXT REFERENCES bills(id),
            category TEXT,
            section_type TEXT,
            section_title TEXT NOT NULL,
            content_html TEXT,
            content_plain TEXT,
            section_order INTEGER NOT NULL DEFAULT 0,
            source_url TEXT,
            summary TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS section_speakers (
            section_id TEXT NOT NULL REFERENCES sections(id),
            member_id TEXT NOT NULL REFERENCES members(id),
            constituency TEXT,
            designation TEXT,
            PRIMARY KEY (section_id, member_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session_attendance (
            session_id TEXT NOT NULL REFERENCES sessions(id),
            member_id TEXT NOT NULL REFERENCES members(id),
            present INTEGER NOT NULL DEFAULT 1,
            constituency TEXT,
            designation TEXT,
            PRIMARY KEY (session_id, member_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='search_index'",
    )
    .fetch_one(pool)
    .await?;

    if !fts_exists {
        sqlx::query(
            r#"
            CREATE VIRTUAL TABLE search_index USING fts5(
                record_id UNINDEXED,
                content_type UNINDEXED,
                title,
                body
            )
            "#,
        )
        .execute(pool)
        .await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_session_id ON sections(session_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sections_bill_id ON sections(bill_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_section_speakers_member_id ON section_speakers(member_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date DESC)")
        .execute(pool)
        .await?;

    tracing::debug!("schema migrations applied");
    Ok(())
}

//! Full-text search index over all content types.
//!
//! Backed by the `search_index` FTS5 table. A search returns opaque match
//! handles (FTS row ids rendered as strings) in rank order; resolving a
//! handle is a separate lookup, so callers can resolve only the handles
//! they are about to display.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::models::{ContentType, Fragment, FragmentMeta};
use crate::records;

/// Repopulate the index from the record tables. Returns the number of
/// entries written.
pub async fn rebuild(pool: &SqlitePool) -> Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM search_index")
        .execute(&mut *tx)
        .await?;

    let mut written = 0usize;
    for content_type in ContentType::ALL {
        let rows = records::index_rows(pool, content_type)
            .await
            .with_context(|| format!("Failed to read {} for indexing", content_type))?;

        for (record_id, title, body) in rows {
            sqlx::query(
                "INSERT INTO search_index (record_id, content_type, title, body) VALUES (?, ?, ?, ?)",
            )
            .bind(&record_id)
            .bind(content_type.as_str())
            .bind(&title)
            .bind(&body)
            .execute(&mut *tx)
            .await?;
            written += 1;
        }

        tracing::debug!(content_type = %content_type, "indexed content type");
    }

    tx.commit().await?;
    tracing::info!(entries = written, "search index rebuilt");
    Ok(written)
}

/// Turn free text into an FTS5 expression: every token quoted (so user
/// input cannot inject FTS syntax) and prefix-matched, all tokens required.
///
/// Returns `None` when the input has no searchable tokens.
pub fn fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|tok| !tok.is_empty())
        .map(|tok| format!("\"{}\"*", tok.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

/// Match handles for `query` within one content type, best match first.
pub async fn search(
    pool: &SqlitePool,
    query: &str,
    content_type: ContentType,
) -> Result<Vec<String>> {
    let expr = match fts_query(query) {
        Some(expr) => expr,
        None => return Ok(Vec::new()),
    };

    let rows = sqlx::query(
        r#"
        SELECT rowid AS handle
        FROM search_index
        WHERE search_index MATCH ? AND content_type = ?
        ORDER BY rank
        "#,
    )
    .bind(&expr)
    .bind(content_type.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| row.get::<i64, _>("handle").to_string())
        .collect())
}

/// Resolve a match handle to its fragment. Unknown or malformed handles
/// resolve to an empty fragment rather than an error.
pub async fn resolve(pool: &SqlitePool, handle: &str) -> Result<Fragment> {
    let rowid: i64 = match handle.parse() {
        Ok(id) => id,
        Err(_) => return Ok(Fragment::default()),
    };

    let row = sqlx::query("SELECT record_id, title FROM search_index WHERE rowid = ?")
        .bind(rowid)
        .fetch_optional(pool)
        .await?;

    Ok(match row {
        Some(row) => Fragment {
            meta: Some(FragmentMeta {
                id: Some(row.get("record_id")),
                title: Some(row.get("title")),
            }),
        },
        None => Fragment::default(),
    })
}

/// Number of entries in the index.
pub async fn entry_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_index")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_query_quotes_and_prefixes_tokens() {
        assert_eq!(
            fts_query("housing grants").as_deref(),
            Some("\"housing\"* \"grants\"*")
        );
    }

    #[test]
    fn fts_query_strips_syntax() {
        assert_eq!(fts_query("\"CPF\" OR-"), Some("\"CPF\"* \"OR\"*".to_string()));
        assert_eq!(fts_query("  -- ** "), None);
    }
}

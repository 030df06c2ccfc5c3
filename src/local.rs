//! Browser sources backed directly by the SQLite store.
//!
//! These give `hansard browse` (without `--remote`) the same behavior the
//! HTTP sources get from a running server, minus the network.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::browser::sources::{BulkSource, Handle, MatchHandle, SearchFilters, SearchIndex};
use crate::browser::Sources;
use crate::models::{BulkData, ContentType, Fragment};
use crate::{records, search_index};

/// The full collection of one content type, read from the database.
pub struct LocalBulkSource {
    pool: SqlitePool,
    content_type: ContentType,
}

impl LocalBulkSource {
    pub fn new(pool: SqlitePool, content_type: ContentType) -> Self {
        Self { pool, content_type }
    }
}

#[async_trait]
impl BulkSource for LocalBulkSource {
    async fn fetch_all(&self) -> Result<BulkData> {
        records::bulk(&self.pool, self.content_type).await
    }
}

/// The FTS5 index. `init` fails while the index is empty, so an
/// unindexed database falls back to substring search.
pub struct LocalSearchIndex {
    pool: SqlitePool,
}

impl LocalSearchIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchIndex for LocalSearchIndex {
    async fn init(&self) -> Result<()> {
        let entries = search_index::entry_count(&self.pool).await?;
        if entries == 0 {
            anyhow::bail!("search index is empty; run `hansard index`");
        }
        tracing::debug!(entries, "local search index ready");
        Ok(())
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Handle>> {
        let handles = search_index::search(&self.pool, query, filters.content_type).await?;
        Ok(handles
            .into_iter()
            .map(|handle| {
                Arc::new(LocalMatchHandle {
                    pool: self.pool.clone(),
                    handle,
                }) as Handle
            })
            .collect())
    }
}

pub struct LocalMatchHandle {
    pool: SqlitePool,
    handle: String,
}

#[async_trait]
impl MatchHandle for LocalMatchHandle {
    async fn resolve(&self) -> Result<Fragment> {
        search_index::resolve(&self.pool, &self.handle).await
    }
}

/// Bulk and index sources for one content type over a pool.
pub fn sources(pool: &SqlitePool, content_type: ContentType) -> Sources {
    Sources {
        bulk: Arc::new(LocalBulkSource::new(pool.clone(), content_type)),
        index: Some(Arc::new(LocalSearchIndex::new(pool.clone()))),
    }
}

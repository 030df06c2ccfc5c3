//! Windowed lazy resolution of search match handles.
//!
//! A [`SearchSession`] holds the ordered handles for one query and caches
//! every resolution by handle index. Showing page P only resolves the
//! window `[(P-1)*size, (P+prefetch)*size)` clipped to the match count,
//! skipping indices that are already cached.

use futures::future::join_all;
use std::collections::HashMap;
use std::ops::Range;

use super::sources::Handle;

#[derive(Clone)]
pub struct SearchSession {
    query: String,
    handles: Vec<Handle>,
    /// Handle index -> resolved record id (`None` when the fragment had no id
    /// or resolution failed).
    resolved: HashMap<usize, Option<String>>,
}

impl SearchSession {
    pub fn new(query: impl Into<String>, handles: Vec<Handle>) -> Self {
        Self {
            query: query.into(),
            handles,
            resolved: HashMap::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Number of matches.
    pub fn total(&self) -> usize {
        self.handles.len()
    }

    /// Handles in `range` that have not been resolved yet.
    pub fn pending(&self, range: Range<usize>) -> Vec<(usize, Handle)> {
        range
            .filter(|i| *i < self.handles.len() && !self.resolved.contains_key(i))
            .map(|i| (i, self.handles[i].clone()))
            .collect()
    }

    pub fn record(&mut self, results: Vec<(usize, Option<String>)>) {
        self.resolved.extend(results);
    }

    /// Resolved ids for `range`, in index order. Unresolved or id-less
    /// entries are skipped.
    pub fn ids(&self, range: Range<usize>) -> Vec<&str> {
        range
            .filter_map(|i| self.resolved.get(&i))
            .filter_map(|id| id.as_deref())
            .collect()
    }
}

/// The index window to resolve when showing `page`.
pub fn resolution_window(
    page: usize,
    page_size: usize,
    prefetch_pages: usize,
    total: usize,
) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = page
        .saturating_add(prefetch_pages)
        .saturating_mul(page_size)
        .min(total);
    start..end.max(start)
}

/// Resolve handles concurrently. A handle that fails to resolve is logged
/// and recorded as having no id, so it is not retried.
pub async fn resolve_all(pending: Vec<(usize, Handle)>) -> Vec<(usize, Option<String>)> {
    if pending.is_empty() {
        return Vec::new();
    }
    tracing::debug!(count = pending.len(), "resolving search matches");

    join_all(pending.into_iter().map(|(index, handle)| async move {
        match handle.resolve().await {
            Ok(fragment) => (index, fragment.record_id().map(str::to_string)),
            Err(err) => {
                tracing::warn!(index, error = %err, "failed to resolve search match");
                (index, None)
            }
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_page_plus_prefetch() {
        assert_eq!(resolution_window(1, 20, 2, 57), 0..57);
        assert_eq!(resolution_window(1, 20, 2, 200), 0..60);
        assert_eq!(resolution_window(2, 20, 2, 200), 20..80);
        assert_eq!(resolution_window(5, 20, 2, 57), 57..57);
        assert_eq!(resolution_window(1, 20, 0, 57), 0..20);
    }
}

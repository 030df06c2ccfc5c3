//! The bulk dataset: fetched at most once per browser instance and shared
//! read-only by every mode that slices or joins against it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::sources::BulkSource;
use crate::models::{BulkData, ListItem};

/// A loaded collection with an id lookup for joining search results.
#[derive(Debug, Default)]
pub struct BulkDataset {
    items: Vec<ListItem>,
    by_id: HashMap<String, usize>,
}

impl BulkDataset {
    pub fn new(data: BulkData) -> Self {
        let by_id = data
            .items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id.clone(), pos))
            .collect();
        Self {
            items: data.items,
            by_id,
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ListItem> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    /// Materialize ids in the given order; ids missing from the dataset
    /// are skipped.
    pub fn join<'a, I>(&self, ids: I) -> Vec<ListItem>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter()
            .filter_map(|id| self.get(id).cloned())
            .collect()
    }
}

/// Memoized bulk fetch. Concurrent callers share the single in-flight
/// request; a failed fetch is logged and cached as an empty collection.
pub struct BulkCache {
    source: Arc<dyn BulkSource>,
    cell: OnceCell<Arc<BulkDataset>>,
}

impl BulkCache {
    pub fn new(source: Arc<dyn BulkSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Arc<BulkDataset> {
        self.cell
            .get_or_init(|| async {
                match self.source.fetch_all().await {
                    Ok(data) => {
                        tracing::debug!(items = data.items.len(), "bulk dataset loaded");
                        Arc::new(BulkDataset::new(data))
                    }
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "bulk dataset fetch failed, continuing with an empty collection"
                        );
                        Arc::new(BulkDataset::default())
                    }
                }
            })
            .await
            .clone()
    }
}

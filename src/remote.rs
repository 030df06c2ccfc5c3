//! Browser sources backed by a running `hansard serve`.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::browser::sources::{http_client, HttpBulkSource, HttpSearchIndex};
use crate::browser::Sources;
use crate::config::RemoteConfig;
use crate::models::{ContentType, ListItem};
use crate::pagination::Paginated;

/// A client for one remote server.
pub struct Remote {
    client: reqwest::Client,
    base_url: String,
}

impl Remote {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The server-rendered first browse page, used as `initial_items`.
    pub async fn first_page(
        &self,
        content_type: ContentType,
        page_size: usize,
    ) -> Result<Paginated<ListItem>> {
        let url = format!("{}/api/{}", self.base_url, content_type);
        let page = self
            .client
            .get(&url)
            .query(&[("page", "1".to_string()), ("per_page", page_size.to_string())])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .json::<Paginated<ListItem>>()
            .await
            .with_context(|| format!("Invalid list page from {}", url))?;
        Ok(page)
    }

    /// URL of the bulk dataset for a content type.
    pub fn data_url(&self, content_type: ContentType) -> String {
        format!("{}/data/{}.json", self.base_url, content_type)
    }

    pub fn sources(&self, content_type: ContentType) -> Result<Sources> {
        Ok(Sources {
            bulk: Arc::new(HttpBulkSource::new(
                self.client.clone(),
                self.data_url(content_type),
            )),
            index: Some(Arc::new(HttpSearchIndex::new(
                self.client.clone(),
                &self.base_url,
            )?)),
        })
    }
}

//! Data sources the list browser consumes.
//!
//! Three seams, each a trait so the browser can run against a live HTTP
//! API, an in-process SQLite database, or test doubles:
//!
//! | Trait | Contract |
//! |-------|----------|
//! | [`BulkSource`] | the full collection, `{ items, total }` |
//! | [`SearchIndex`] | ordered match handles for a query |
//! | [`MatchHandle`] | lazily resolves to a [`Fragment`] carrying a record id |

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::models::{BulkData, ContentType, Fragment};

/// Provides the full, unpaginated collection for one content type.
#[async_trait]
pub trait BulkSource: Send + Sync {
    async fn fetch_all(&self) -> Result<BulkData>;
}

/// Filters passed along with every index query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilters {
    pub content_type: ContentType,
}

/// One search match. Resolving it may be costly (a network round trip),
/// so the browser only resolves the handles it is about to show.
#[async_trait]
pub trait MatchHandle: Send + Sync {
    async fn resolve(&self) -> Result<Fragment>;
}

pub type Handle = Arc<dyn MatchHandle>;

/// An external full-text index.
///
/// [`init`](SearchIndex::init) is called once before the first search; an
/// error there (or from any later search) switches the browser to its
/// substring fallback for the rest of its lifetime.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Match handles in relevance order.
    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Handle>>;
}

/// Shared HTTP client with a request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hansard-browser/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

// ============ HTTP bulk source ============

/// `GET <data_url>` returning `{ items, total }`.
pub struct HttpBulkSource {
    client: reqwest::Client,
    url: String,
}

impl HttpBulkSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BulkSource for HttpBulkSource {
    async fn fetch_all(&self) -> Result<BulkData> {
        let data = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()?
            .json::<BulkData>()
            .await
            .with_context(|| format!("Invalid bulk data from {}", self.url))?;
        Ok(data)
    }
}

// ============ HTTP search index ============

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    handle: String,
}

/// Search index served by `hansard serve`:
/// `GET /search/meta`, `GET /search?q=&type=`, `GET /fragment/{handle}`.
pub struct HttpSearchIndex {
    client: reqwest::Client,
    base: Url,
}

impl HttpSearchIndex {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid search index URL: {}", base_url))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("search index URL cannot be a base: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl SearchIndex for HttpSearchIndex {
    async fn init(&self) -> Result<()> {
        let url = self.endpoint(&["search", "meta"])?;
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?;
        Ok(())
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Handle>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("type", filters.content_type.as_str());

        let resp: SearchResponse = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()?
            .json()
            .await?;

        resp.results
            .into_iter()
            .map(|hit| {
                let url = self.endpoint(&["fragment", &hit.handle])?;
                Ok(Arc::new(HttpMatchHandle {
                    client: self.client.clone(),
                    url,
                }) as Handle)
            })
            .collect()
    }
}

/// A match whose fragment lives at `GET /fragment/{handle}`.
pub struct HttpMatchHandle {
    client: reqwest::Client,
    url: Url,
}

#[async_trait]
impl MatchHandle for HttpMatchHandle {
    async fn resolve(&self) -> Result<Fragment> {
        let fragment = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()?
            .json::<Fragment>()
            .await?;
        Ok(fragment)
    }
}

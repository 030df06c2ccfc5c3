//! The list browser: pagination, free-text search, and date filtering over
//! one content collection, kept in sync with the URL.
//!
//! # Data acquisition
//!
//! | Mode | Source | Pagination |
//! |------|--------|------------|
//! | Browse, page 1 | `initial_items` | none |
//! | Browse, page > 1 | bulk dataset | slice |
//! | DateFilter | bulk dataset, date-filtered once per filter | slice |
//! | Search | search index, windowed resolution | resolve page + prefetch |
//! | SearchDateFilter | search index, fully resolved | join, filter, slice |
//!
//! Without a usable search index, search falls back to substring matching
//! over the bulk dataset (always fully resolved).
//!
//! # Staleness
//!
//! Every transition takes a new generation number. Work runs without
//! holding any lock; the result is committed only if no newer transition
//! started in the meantime, otherwise it is dropped along with any cache
//! updates it produced.

pub mod bulk;
pub mod filter;
pub mod history;
pub mod render;
pub mod sources;
pub mod state;
pub mod url_state;
pub mod window;

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::BrowserConfig;
use crate::models::{ContentType, ListItem};

use self::bulk::BulkCache;
use self::history::History;
use self::sources::{BulkSource, SearchFilters, SearchIndex};
use self::window::{resolution_window, resolve_all, SearchSession};

pub use self::state::{reduce, BrowseState, Event, Mode};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_PREFETCH_PAGES: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// Construction parameters supplied by the host page.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub content_type: ContentType,
    /// Where the bulk dataset lives (informational for in-process sources).
    pub data_url: String,
    /// Server-computed record count for unfiltered browse.
    pub total_count: usize,
    pub page_size: usize,
    pub prefetch_pages: usize,
    pub debounce: Duration,
    pub placeholder: String,
    pub show_search: bool,
    /// Page 1 of the unfiltered browse view, as rendered by the server.
    pub initial_items: Vec<ListItem>,
}

impl BrowserOptions {
    pub fn new(content_type: ContentType, data_url: impl Into<String>) -> Self {
        Self {
            content_type,
            data_url: data_url.into(),
            total_count: 0,
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_pages: DEFAULT_PREFETCH_PAGES,
            debounce: DEFAULT_DEBOUNCE,
            placeholder: format!("Search {}...", content_type),
            show_search: true,
            initial_items: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: &BrowserConfig) -> Self {
        self.page_size = config.page_size.max(1);
        self.prefetch_pages = config.prefetch_pages;
        self.debounce = Duration::from_millis(config.debounce_ms);
        self
    }

    pub fn with_initial_page(mut self, items: Vec<ListItem>, total_count: usize) -> Self {
        self.initial_items = items;
        self.total_count = total_count;
        self
    }
}

/// The collaborators a browser reads from.
#[derive(Clone)]
pub struct Sources {
    pub bulk: Arc<dyn BulkSource>,
    pub index: Option<Arc<dyn SearchIndex>>,
}

/// What is on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub mode: Mode,
    pub page: usize,
    pub items: Vec<ListItem>,
    /// Result count across all pages.
    pub total: usize,
    pub total_pages: usize,
    pub status_text: String,
    /// A transition is in flight and has not committed yet.
    pub loading: bool,
}

impl View {
    fn initial(options: &BrowserOptions) -> Self {
        let total = options.total_count;
        Self {
            mode: Mode::Browse,
            page: 1,
            items: options.initial_items.clone(),
            total,
            total_pages: filter::total_pages(total, options.page_size),
            status_text: render::status_text(Mode::Browse, "", 1, options.page_size, total),
            loading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The transition's results are now on screen.
    Committed,
    /// A newer transition started first; the results were discarded.
    Superseded,
}

/// Everything bound at mount time. Replaced wholesale on unmount and
/// remount, which drops the bulk cache and the index state with it.
struct Binding {
    options: BrowserOptions,
    sources: Sources,
    bulk: BulkCache,
    index_ready: OnceCell<bool>,
    index_failed: AtomicBool,
}

impl Binding {
    fn new(options: BrowserOptions, sources: Sources) -> Self {
        Self {
            options,
            bulk: BulkCache::new(sources.bulk.clone()),
            sources,
            index_ready: OnceCell::new(),
            index_failed: AtomicBool::new(false),
        }
    }

    /// Same options and sources, nothing loaded.
    fn fresh(&self) -> Self {
        Self::new(self.options.clone(), self.sources.clone())
    }

    /// The index, loaded on first use, or `None` once it has failed.
    async fn index(&self) -> Option<Arc<dyn SearchIndex>> {
        let index = self.sources.index.as_ref()?;
        if self.index_failed.load(Ordering::SeqCst) {
            return None;
        }
        let ready = *self
            .index_ready
            .get_or_init(|| async {
                match index.init().await {
                    Ok(()) => true,
                    Err(err) => {
                        self.mark_failed(&err);
                        false
                    }
                }
            })
            .await;
        ready.then(|| index.clone())
    }

    fn mark_failed(&self, err: &anyhow::Error) {
        if !self.index_failed.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                content_type = %self.options.content_type,
                error = %err,
                "search index unavailable, falling back to substring search"
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterKey {
    query: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl FilterKey {
    fn of(state: &BrowseState) -> Self {
        Self {
            query: state.effective_query().map(str::to_string),
            from: state.date_from.clone(),
            to: state.date_to.clone(),
        }
    }
}

/// A fully resolved result set, computed once per filter change.
struct FilteredSet {
    key: FilterKey,
    items: Arc<Vec<ListItem>>,
}

struct Inner {
    state: BrowseState,
    view: View,
    session: Option<SearchSession>,
    filtered: Option<FilteredSet>,
}

/// Cache updates produced by a load, applied only if it commits.
#[derive(Default)]
struct CacheUpdate {
    session: Option<SearchSession>,
    filtered: Option<FilteredSet>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ListBrowser {
    binding: Mutex<Arc<Binding>>,
    history: Arc<dyn History>,
    generation: AtomicU64,
    input_seq: AtomicU64,
    inner: Mutex<Inner>,
}

impl ListBrowser {
    pub fn new(options: BrowserOptions, sources: Sources, history: Arc<dyn History>) -> Self {
        let view = View::initial(&options);
        Self {
            binding: Mutex::new(Arc::new(Binding::new(options, sources))),
            history,
            generation: AtomicU64::new(0),
            input_seq: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                state: BrowseState::default(),
                view,
                session: None,
                filtered: None,
            }),
        }
    }

    fn binding(&self) -> Arc<Binding> {
        lock(&self.binding).clone()
    }

    pub fn content_type(&self) -> ContentType {
        self.binding().options.content_type
    }

    pub fn state(&self) -> BrowseState {
        lock(&self.inner).state.clone()
    }

    pub fn view(&self) -> View {
        lock(&self.inner).view.clone()
    }

    // ============ Operations ============

    /// Build state from the page URL and load it.
    pub async fn mount(&self, url: &str) -> Outcome {
        self.navigate(url).await
    }

    /// Back/forward navigation: decode the URL and run it through the same
    /// transition function as interactive input.
    pub async fn navigate(&self, url: &str) -> Outcome {
        self.cancel_pending_input();
        self.transition(Event::Navigated(url_state::decode(url))).await
    }

    /// Apply a query immediately.
    pub async fn set_query(&self, query: impl Into<String>) -> Outcome {
        self.cancel_pending_input();
        self.transition(Event::QueryChanged(query.into())).await
    }

    /// Apply a query after the debounce interval, unless more input (or an
    /// explicit query change) arrives first. Returns `None` when this input
    /// was overtaken.
    pub async fn input_query(&self, query: impl Into<String>) -> Option<Outcome> {
        let query = query.into();
        let seq = self.input_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let debounce = self.binding().options.debounce;

        tokio::time::sleep(debounce).await;

        if self.input_seq.load(Ordering::SeqCst) != seq {
            return None;
        }
        Some(self.transition(Event::QueryChanged(query)).await)
    }

    pub async fn clear_query(&self) -> Outcome {
        self.cancel_pending_input();
        self.transition(Event::QueryCleared).await
    }

    pub async fn set_page(&self, page: usize) -> Outcome {
        self.transition(Event::PageChanged(page)).await
    }

    /// Go to the next page, if there is one.
    pub async fn next_page(&self) -> Option<Outcome> {
        let view = self.view();
        if view.page >= view.total_pages {
            return None;
        }
        Some(self.set_page(view.page + 1).await)
    }

    /// Go to the previous page, if there is one.
    pub async fn prev_page(&self) -> Option<Outcome> {
        let page = self.state().page;
        if page <= 1 {
            return None;
        }
        Some(self.set_page(page - 1).await)
    }

    pub async fn set_date_from(&self, from: Option<String>) -> Outcome {
        self.transition(Event::DateFromChanged(from)).await
    }

    pub async fn set_date_to(&self, to: Option<String>) -> Outcome {
        self.transition(Event::DateToChanged(to)).await
    }

    pub async fn set_date_range(&self, from: Option<String>, to: Option<String>) -> Outcome {
        self.transition(Event::DateRangeChanged { from, to }).await
    }

    /// Clear query and dates, back to browse page 1.
    pub async fn clear_filters(&self) -> Outcome {
        self.cancel_pending_input();
        self.transition(Event::FiltersCleared).await
    }

    /// Cancel everything in flight and drop every cache, including the bulk
    /// dataset and the index state.
    pub fn unmount(&self) {
        let mut inner = lock(&self.inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_pending_input();
        inner.session = None;
        inner.filtered = None;
        inner.view.loading = false;

        let mut binding = lock(&self.binding);
        *binding = Arc::new(binding.fresh());
        tracing::debug!("list browser unmounted");
    }

    /// Rebind to a new collection (content-type change): all caches are
    /// dropped and state is rebuilt from `url`.
    pub async fn remount(&self, options: BrowserOptions, sources: Sources, url: &str) -> Outcome {
        self.unmount();
        {
            let mut inner = lock(&self.inner);
            inner.state = BrowseState::default();
            inner.view = View::initial(&options);
        }
        *lock(&self.binding) = Arc::new(Binding::new(options, sources));
        self.mount(url).await
    }

    /// Status line, search box, and cards for the committed view.
    pub fn render(&self) -> String {
        let binding = self.binding();
        let options = &binding.options;
        let (state, view) = {
            let inner = lock(&self.inner);
            (inner.state.clone(), inner.view.clone())
        };

        let mut out = String::new();
        if options.show_search {
            if state.query.is_empty() {
                out.push_str(&format!("Search: [{}]\n", options.placeholder));
            } else {
                out.push_str(&format!("Search: {}\n", state.query));
            }
        }
        if view.mode.has_date_filter() {
            out.push_str(&format!(
                "Dates: {} to {}\n",
                state.date_from.as_deref().unwrap_or("..."),
                state.date_to.as_deref().unwrap_or("...")
            ));
        }
        out.push_str(&render::render_view(options.content_type, &view));
        out
    }

    // ============ Internals ============

    fn cancel_pending_input(&self) {
        self.input_seq.fetch_add(1, Ordering::SeqCst);
    }

    async fn transition(&self, event: Event) -> Outcome {
        let (generation, state) = {
            let mut inner = lock(&self.inner);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            inner.state = reduce(&inner.state, event);
            inner.view.loading = true;
            self.history.replace(&url_state::encode(&inner.state));
            (generation, inner.state.clone())
        };

        tracing::debug!(
            generation,
            mode = ?state.mode(),
            page = state.page,
            "browse transition"
        );

        self.load(generation, &state).await
    }

    async fn load(&self, generation: u64, state: &BrowseState) -> Outcome {
        let binding = self.binding();
        let options = &binding.options;
        let page_size = options.page_size;
        let mut update = CacheUpdate::default();

        let (items, total) = match state.mode() {
            Mode::Browse if state.page <= 1 => {
                (options.initial_items.clone(), options.total_count)
            }
            Mode::Browse => {
                let bulk = binding.bulk.get().await;
                (
                    filter::page_slice(bulk.items(), state.page, page_size),
                    options.total_count,
                )
            }
            Mode::Search => match self.windowed_page(&binding, state, &mut update).await {
                Some(page) => page,
                None => {
                    let set = self.filtered_set(&binding, state, &mut update).await;
                    (filter::page_slice(set.as_slice(), state.page, page_size), set.len())
                }
            },
            Mode::DateFilter | Mode::SearchDateFilter => {
                let set = self.filtered_set(&binding, state, &mut update).await;
                (filter::page_slice(set.as_slice(), state.page, page_size), set.len())
            }
        };

        self.commit(generation, state, &binding, items, total, update)
    }

    /// Search mode with a working index: resolve the page plus prefetch
    /// window, then join the page's ids to the bulk dataset. `None` means
    /// the index is unavailable.
    async fn windowed_page(
        &self,
        binding: &Binding,
        state: &BrowseState,
        update: &mut CacheUpdate,
    ) -> Option<(Vec<ListItem>, usize)> {
        let query = state.effective_query()?;
        let options = &binding.options;

        let bulk = binding.bulk.get().await;
        let mut session = self.search_session(binding, query).await?;

        let total = session.total();
        let window = resolution_window(state.page, options.page_size, options.prefetch_pages, total);
        let resolved = resolve_all(session.pending(window)).await;
        session.record(resolved);

        let page = filter::page_range(state.page, options.page_size, total);
        let items = bulk.join(session.ids(page));

        update.session = Some(session);
        Some((items, total))
    }

    /// The fully resolved result set for the state's filters: date filter
    /// only, search plus date filter, or the substring fallback.
    async fn filtered_set(
        &self,
        binding: &Binding,
        state: &BrowseState,
        update: &mut CacheUpdate,
    ) -> Arc<Vec<ListItem>> {
        let key = FilterKey::of(state);
        {
            let inner = lock(&self.inner);
            if let Some(cached) = inner.filtered.as_ref().filter(|f| f.key == key) {
                return cached.items.clone();
            }
        }

        let bulk = binding.bulk.get().await;
        let from = state.date_from.as_deref();
        let to = state.date_to.as_deref();

        let items = match state.effective_query() {
            None => filter::filter_by_date(bulk.items(), from, to),
            Some(query) => match self.search_session(binding, query).await {
                Some(mut session) => {
                    let all = 0..session.total();
                    let resolved = resolve_all(session.pending(all.clone())).await;
                    session.record(resolved);
                    let joined = bulk.join(session.ids(all));
                    update.session = Some(session);
                    filter::filter_by_date(&joined, from, to)
                }
                None => {
                    let matched = filter::substring_search(bulk.items(), query);
                    filter::filter_by_date(&matched, from, to)
                }
            },
        };

        let items = Arc::new(items);
        update.filtered = Some(FilteredSet {
            key,
            items: items.clone(),
        });
        items
    }

    /// A working copy of the search session for `query`: the cached one if
    /// it matches, otherwise a fresh index search. `None` when no index is
    /// usable.
    async fn search_session(&self, binding: &Binding, query: &str) -> Option<SearchSession> {
        {
            let inner = lock(&self.inner);
            if let Some(session) = inner.session.as_ref().filter(|s| s.query() == query) {
                return Some(session.clone());
            }
        }

        let index = binding.index().await?;
        let filters = SearchFilters {
            content_type: binding.options.content_type,
        };
        match index.search(query, &filters).await {
            Ok(handles) => {
                tracing::debug!(query, matches = handles.len(), "search index returned matches");
                Some(SearchSession::new(query, handles))
            }
            Err(err) => {
                binding.mark_failed(&err);
                None
            }
        }
    }

    fn commit(
        &self,
        generation: u64,
        state: &BrowseState,
        binding: &Binding,
        items: Vec<ListItem>,
        total: usize,
        update: CacheUpdate,
    ) -> Outcome {
        let mut inner = lock(&self.inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded browse result");
            return Outcome::Superseded;
        }

        if let Some(session) = update.session {
            inner.session = Some(session);
        }
        if let Some(filtered) = update.filtered {
            inner.filtered = Some(filtered);
        }

        let page_size = binding.options.page_size;
        let mode = state.mode();
        inner.view = View {
            mode,
            page: state.page,
            items,
            total,
            total_pages: filter::total_pages(total, page_size),
            status_text: render::status_text(mode, &state.query, state.page, page_size, total),
            loading: false,
        };
        Outcome::Committed
    }
}

//! Browse state and its pure transition function.
//!
//! [`BrowseState`] holds the four independent inputs (query, page, and the
//! two date bounds). The display [`Mode`] is never stored: it is derived
//! from those inputs by [`BrowseState::mode`].

use chrono::NaiveDate;
use serde::Serialize;

/// Queries shorter than this (after trimming) count as no query at all.
pub const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Browse,
    DateFilter,
    Search,
    SearchDateFilter,
}

impl Mode {
    pub fn has_date_filter(&self) -> bool {
        matches!(self, Mode::DateFilter | Mode::SearchDateFilter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    /// Raw query text as typed; see [`BrowseState::effective_query`].
    pub query: String,
    /// 1-based page number.
    pub page: usize,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            query: String::new(),
            page: 1,
            date_from: None,
            date_to: None,
        }
    }
}

impl BrowseState {
    /// The trimmed query, if it is long enough to search with.
    pub fn effective_query(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (trimmed.chars().count() >= MIN_QUERY_CHARS).then_some(trimmed)
    }

    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    pub fn mode(&self) -> Mode {
        match (self.effective_query().is_some(), self.has_date_bounds()) {
            (true, true) => Mode::SearchDateFilter,
            (true, false) => Mode::Search,
            (false, true) => Mode::DateFilter,
            (false, false) => Mode::Browse,
        }
    }

    /// Bring a state from an untrusted origin (a URL) into canonical form:
    /// page at least 1, dates either valid or absent.
    pub fn normalized(self) -> Self {
        Self {
            query: self.query,
            page: self.page.max(1),
            date_from: normalize_date(self.date_from),
            date_to: normalize_date(self.date_to),
        }
    }
}

/// Keep a date bound only if it is a real `YYYY-MM-DD` calendar date.
pub fn normalize_date(date: Option<String>) -> Option<String> {
    let date = date?;
    let trimmed = date.trim();
    if trimmed.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|_| trimmed.to_string())
}

/// Everything that can change the browse state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    QueryChanged(String),
    DateFromChanged(Option<String>),
    DateToChanged(Option<String>),
    DateRangeChanged {
        from: Option<String>,
        to: Option<String>,
    },
    PageChanged(usize),
    QueryCleared,
    FiltersCleared,
    /// Initial load or back/forward: the decoded URL state.
    Navigated(BrowseState),
}

/// The transition function. Query and date changes always go back to
/// page 1; page changes keep the filters.
pub fn reduce(state: &BrowseState, event: Event) -> BrowseState {
    match event {
        Event::QueryChanged(query) => BrowseState {
            query,
            page: 1,
            ..state.clone()
        },
        Event::DateFromChanged(from) => BrowseState {
            page: 1,
            date_from: normalize_date(from),
            ..state.clone()
        },
        Event::DateToChanged(to) => BrowseState {
            page: 1,
            date_to: normalize_date(to),
            ..state.clone()
        },
        Event::DateRangeChanged { from, to } => BrowseState {
            query: state.query.clone(),
            page: 1,
            date_from: normalize_date(from),
            date_to: normalize_date(to),
        },
        Event::PageChanged(page) => BrowseState {
            page: page.max(1),
            ..state.clone()
        },
        Event::QueryCleared => BrowseState {
            query: String::new(),
            page: 1,
            ..state.clone()
        },
        Event::FiltersCleared => BrowseState::default(),
        Event::Navigated(next) => next.normalized(),
    }
}

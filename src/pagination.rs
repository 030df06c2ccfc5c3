//! Server-side paging for `/api/{type}` and `hansard list`.

use serde::{Deserialize, Serialize};

const MAX_PER_PAGE: u32 = 100;

/// Page size when a request does not name one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A validated page request: `page >= 1`, `per_page` in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// One page of records plus the collection total, as served by the list
/// endpoint and read back by the remote browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Zero for an empty collection.
    pub fn total_pages(&self) -> u32 {
        let total = u64::try_from(self.total).unwrap_or(0);
        let pages = total.div_ceil(u64::from(self.per_page.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn next_page(&self) -> Option<u32> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        (self.page > 1).then(|| (self.page - 1).min(self.total_pages().max(1)))
    }
}

/// `?page=&per_page=` on the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(total: i64, page: u32) -> Paginated<()> {
        Paginated {
            items: vec![],
            total,
            page,
            per_page: 10,
        }
    }

    #[test]
    fn request_is_clamped() {
        assert_eq!(Pagination::new(0, 10), Pagination::new(1, 10));
        assert_eq!(Pagination::new(1, 0).per_page, 1);
        assert_eq!(Pagination::new(1, 999).per_page, 100);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
        assert_eq!(Pagination::new(u32::MAX, 100).offset(), (i64::from(u32::MAX) - 1) * 100);
    }

    #[test]
    fn params_default_to_first_page() {
        let p: Pagination = PaginationParams::default().into();
        assert_eq!(p, Pagination::new(1, DEFAULT_PER_PAGE));
    }

    #[test]
    fn neighbours() {
        assert_eq!(page_of(0, 1).total_pages(), 0);
        assert_eq!(page_of(0, 1).next_page(), None);
        assert_eq!(page_of(25, 1).total_pages(), 3);
        assert_eq!(page_of(30, 1).next_page(), Some(2));
        assert_eq!(page_of(30, 1).prev_page(), None);
        assert_eq!(page_of(30, 3).next_page(), None);
        assert_eq!(page_of(30, 3).prev_page(), Some(2));
        // Past the end, "previous" points back at the last real page.
        assert_eq!(page_of(30, 9).prev_page(), Some(3));
    }
}

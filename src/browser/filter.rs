//! Client-side filtering and slicing over the bulk dataset.

use crate::models::ListItem;

/// Inclusive date-range test by plain string comparison on ISO dates.
///
/// With no bounds every item passes. With any bound set, items without a
/// date are excluded.
pub fn in_date_range(item: &ListItem, from: Option<&str>, to: Option<&str>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let date = match item.date.as_deref() {
        Some(d) => d,
        None => return false,
    };
    if let Some(from) = from {
        if date < from {
            return false;
        }
    }
    if let Some(to) = to {
        if date > to {
            return false;
        }
    }
    true
}

pub fn filter_by_date<'a, I>(items: I, from: Option<&str>, to: Option<&str>) -> Vec<ListItem>
where
    I: IntoIterator<Item = &'a ListItem>,
{
    items
        .into_iter()
        .filter(|item| in_date_range(item, from, to))
        .cloned()
        .collect()
}

/// Text the substring fallback searches: title, ministry, snippet, and
/// speakers, lowercased.
fn haystack(item: &ListItem) -> String {
    let mut text = item.title.to_lowercase();
    for part in [item.ministry.as_deref(), item.snippet.as_deref()]
        .into_iter()
        .flatten()
    {
        text.push(' ');
        text.push_str(&part.to_lowercase());
    }
    if let Some(speakers) = &item.speakers {
        text.push(' ');
        text.push_str(&speakers.join(" ").to_lowercase());
    }
    text
}

/// Case-insensitive substring search over the whole collection, in
/// collection order. Used when the search index is unavailable.
pub fn substring_search(items: &[ListItem], query: &str) -> Vec<ListItem> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|item| haystack(item).contains(&needle))
        .cloned()
        .collect()
}

/// Index range `[start, end)` of `page` (1-based), clipped to `total`.
pub fn page_range(page: usize, page_size: usize, total: usize) -> std::ops::Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

pub fn page_slice<T: Clone>(items: &[T], page: usize, page_size: usize) -> Vec<T> {
    items[page_range(page, page_size, items.len())].to_vec()
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

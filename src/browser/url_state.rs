//! Projection of [`BrowseState`] onto URL query parameters and back.
//!
//! Canonical encoding: `q` present iff the query is non-empty, `page` iff
//! greater than 1, `from` and `to` iff set, always in that order. Decoding
//! accepts a bare query string, one with a leading `?`, or a full URL.

use url::form_urlencoded;
use url::Url;

use super::state::BrowseState;

/// Encode a state as a query string without the leading `?`.
/// The default state encodes to the empty string.
pub fn encode(state: &BrowseState) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    if !state.query.is_empty() {
        out.append_pair("q", &state.query);
    }
    if state.page > 1 {
        out.append_pair("page", &state.page.to_string());
    }
    if let Some(from) = &state.date_from {
        out.append_pair("from", from);
    }
    if let Some(to) = &state.date_to {
        out.append_pair("to", to);
    }
    out.finish()
}

/// Encode a state as a relative location (`path?query`, or just `path`).
pub fn location(path: &str, state: &BrowseState) -> String {
    let query = encode(state);
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

/// Decode a query string (or URL) into a normalized state. Unknown
/// parameters are ignored; the first occurrence of a repeated one wins.
pub fn decode(input: &str) -> BrowseState {
    let query = extract_query(input);

    let mut q: Option<String> = None;
    let mut page: Option<String> = None;
    let mut from: Option<String> = None;
    let mut to: Option<String> = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let slot = match key.as_ref() {
            "q" => &mut q,
            "page" => &mut page,
            "from" => &mut from,
            "to" => &mut to,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    BrowseState {
        query: q.unwrap_or_default(),
        page: page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1),
        date_from: from,
        date_to: to,
    }
    .normalized()
}

fn extract_query(input: &str) -> String {
    let input = input.trim();
    if input.contains("://") {
        if let Ok(url) = Url::parse(input) {
            return url.query().unwrap_or_default().to_string();
        }
    }
    match input.split_once('?') {
        Some((_, query)) => query.to_string(),
        None => input.trim_start_matches('?').to_string(),
    }
}

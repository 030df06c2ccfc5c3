//! Plain-text rendering: status line and one card renderer per content type.

use super::filter::page_range;
use super::state::Mode;
use super::View;
use crate::models::{ContentType, ListItem};

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

/// The line shown above the list.
pub fn status_text(
    mode: Mode,
    query: &str,
    page: usize,
    page_size: usize,
    total: usize,
) -> String {
    if total == 0 {
        return match mode {
            Mode::Browse => "No items".to_string(),
            _ => "No results found".to_string(),
        };
    }

    match mode {
        Mode::Browse => {
            let shown = page_range(page, page_size, total);
            if shown.is_empty() {
                return "No items".to_string();
            }
            format!("Showing {}-{} of {}", shown.start + 1, shown.end, total)
        }
        Mode::Search => format!("{} for \"{}\"", plural(total, "result"), query.trim()),
        Mode::DateFilter => format!("{} in date range", plural(total, "item")),
        Mode::SearchDateFilter => format!(
            "{} for \"{}\" in date range",
            plural(total, "result"),
            query.trim()
        ),
    }
}

/// Render one item as a card for its content type.
pub fn render_card(content_type: ContentType, item: &ListItem) -> String {
    match content_type {
        ContentType::Sessions => session_card(item),
        ContentType::Sections => section_card(item),
        ContentType::Bills => bill_card(item),
        ContentType::Members => member_card(item),
        ContentType::Ministries => ministry_card(item),
    }
}

fn dated_heading(item: &ListItem) -> String {
    match &item.date {
        Some(date) => format!("[{}] {}", date, item.title),
        None => item.title.clone(),
    }
}

fn push_snippet(out: &mut String, item: &ListItem) {
    if let Some(snippet) = &item.snippet {
        out.push_str("\n    ");
        out.push_str(snippet);
    }
}

fn session_card(item: &ListItem) -> String {
    let mut out = dated_heading(item);
    if let Some(format) = &item.category {
        out.push_str(&format!("\n    format: {}", format));
    }
    push_snippet(&mut out, item);
    out
}

fn section_card(item: &ListItem) -> String {
    let mut out = dated_heading(item);
    if let Some(ministry) = &item.ministry {
        out.push_str(&format!(" ({})", ministry));
    }
    let kind: Vec<&str> = [item.item_type.as_deref(), item.category.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !kind.is_empty() {
        out.push_str(&format!("\n    {}", kind.join(" / ")));
    }
    if let Some(speakers) = item.speakers.as_ref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("\n    Speakers: {}", speakers.join(", ")));
    }
    push_snippet(&mut out, item);
    out
}

fn bill_card(item: &ListItem) -> String {
    let mut out = dated_heading(item);
    if let Some(ministry) = &item.ministry {
        out.push_str(&format!(" ({})", ministry));
    }
    if let Some(stage) = &item.category {
        out.push_str(&format!("\n    stage: {}", stage.replace('_', " ")));
    }
    push_snippet(&mut out, item);
    out
}

fn member_card(item: &ListItem) -> String {
    let mut out = item.title.clone();
    push_snippet(&mut out, item);
    out
}

fn ministry_card(item: &ListItem) -> String {
    match &item.ministry {
        Some(acronym) => format!("{} ({})", item.title, acronym),
        None => item.title.clone(),
    }
}

/// Status line, cards, and a page indicator when there is more than one page.
pub fn render_view(content_type: ContentType, view: &View) -> String {
    let mut out = String::new();
    out.push_str(&view.status_text);
    out.push('\n');

    for item in &view.items {
        out.push('\n');
        out.push_str(&render_card(content_type, item));
        out.push('\n');
    }

    if view.total_pages > 1 {
        out.push_str(&format!("\nPage {} of {}\n", view.page, view.total_pages));
    }
    out
}

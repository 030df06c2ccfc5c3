//! Core data models shared by the record store, the HTTP API, and the
//! list browser.
//!
//! [`ListItem`] is the display-ready shape every list page, bulk dataset,
//! and search result is expressed in. Its `id` is the join key between the
//! search index and the bulk dataset.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of parliamentary records that can be browsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A single day's sitting of parliament.
    Sessions,
    /// An atomic proceeding record: question, bill reading, motion, speech.
    Sections,
    Bills,
    Members,
    Ministries,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Sessions,
        ContentType::Sections,
        ContentType::Bills,
        ContentType::Members,
        ContentType::Ministries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Sessions => "sessions",
            ContentType::Sections => "sections",
            ContentType::Bills => "bills",
            ContentType::Members => "members",
            ContentType::Ministries => "ministries",
        }
    }

    /// Whether records of this type carry a `date` at all.
    pub fn is_dated(&self) -> bool {
        matches!(
            self,
            ContentType::Sessions | ContentType::Sections | ContentType::Bills
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sessions" | "session" | "sittings" => Ok(ContentType::Sessions),
            "sections" | "section" | "speeches" => Ok(ContentType::Sections),
            "bills" | "bill" => Ok(ContentType::Bills),
            "members" | "member" => Ok(ContentType::Members),
            "ministries" | "ministry" => Ok(ContentType::Ministries),
            other => bail!(
                "Unknown content type: '{}'. Use sessions, sections, bills, members, or ministries.",
                other
            ),
        }
    }
}

/// A display-ready record shown in list pages and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Stable identifier, unique within a content type.
    pub id: String,
    /// ISO `YYYY-MM-DD`, absent for undated records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ministry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub item_type: Option<String>,
    /// Speaker names in speaking order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speakers: Option<Vec<String>>,
    /// Truncated plain-text excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl ListItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date: None,
            title: title.into(),
            ministry: None,
            category: None,
            item_type: None,
            speakers: None,
            snippet: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// The full, unpaginated collection for one content type.
///
/// Wire shape of the bulk data endpoint: `{ "items": [...], "total": n }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkData {
    pub items: Vec<ListItem>,
    pub total: usize,
}

/// A record's detail page: the list item plus its body and related records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub item: ListItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// The content type of the entries in `related`.
    pub related_type: ContentType,
    pub related: Vec<ListItem>,
}

/// What a search match handle resolves to.
///
/// Wire shape: `{ "meta": { "id": "..." } }`. Either level may be absent,
/// in which case the match cannot be joined to a record and is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FragmentMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Fragment {
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            meta: Some(FragmentMeta {
                id: Some(id.into()),
                title: None,
            }),
        }
    }

    /// The record id this fragment points at, if any.
    pub fn record_id(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.id.as_deref())
    }
}

/// Maximum snippet length, in characters.
pub const SNIPPET_CHARS: usize = 200;

/// Truncate `text` to at most `max_chars` characters, on a char boundary,
/// collapsing whitespace and appending `...` when anything was cut.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

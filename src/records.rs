//! Read side of the parliamentary record store.
//!
//! Every content type is projected into the same column set so a single
//! row mapper produces [`ListItem`]s for list pages, bulk datasets, detail
//! pages, and related-record lists:
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `id` | record id |
//! | `date` | ISO date or NULL |
//! | `title` | display title |
//! | `ministry` | ministry acronym |
//! | `category` | category (section category, bill stage, sitting format) |
//! | `item_type` | section type, or `bill` |
//! | `speakers` | `|`-joined member names in speaking order |
//! | `body` | plain text used for the snippet and the detail body |
//! | `source_url` | link to the official record |

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{truncate_snippet, BulkData, ContentType, ListItem, RecordDetail, SNIPPET_CHARS};
use crate::pagination::{Paginated, Pagination};

const SESSIONS_SELECT: &str = r#"
    SELECT s.id AS id,
           s.date AS date,
           CASE WHEN s.sitting_no IS NOT NULL
                THEN 'Sitting No. ' || s.sitting_no
                ELSE 'Sitting of ' || s.date END AS title,
           NULL AS ministry,
           s.format AS category,
           NULL AS item_type,
           NULL AS speakers,
           s.summary AS body,
           s.url AS source_url
    FROM sessions s
"#;

const SECTIONS_SELECT: &str = r#"
    SELECT sec.id AS id,
           ses.date AS date,
           sec.section_title AS title,
           mi.acronym AS ministry,
           sec.category AS category,
           sec.section_type AS item_type,
           (SELECT group_concat(mem.name, '|' ORDER BY sp.rowid)
                FROM section_speakers sp
                JOIN members mem ON mem.id = sp.member_id
                WHERE sp.section_id = sec.id) AS speakers,
           COALESCE(sec.content_plain, sec.summary) AS body,
           sec.source_url AS source_url
    FROM sections sec
    JOIN sessions ses ON ses.id = sec.session_id
    LEFT JOIN ministries mi ON mi.id = sec.ministry_id
"#;

const BILLS_SELECT: &str = r#"
    SELECT b.id AS id,
           COALESCE(b.first_reading_date, b.second_reading_date) AS date,
           b.title AS title,
           mi.acronym AS ministry,
           CASE WHEN b.second_reading_date IS NOT NULL THEN 'second_reading'
                WHEN b.first_reading_date IS NOT NULL THEN 'first_reading'
                ELSE NULL END AS category,
           'bill' AS item_type,
           NULL AS speakers,
           b.summary AS body,
           NULL AS source_url
    FROM bills b
    LEFT JOIN ministries mi ON mi.id = b.ministry_id
"#;

const MEMBERS_SELECT: &str = r#"
    SELECT mem.id AS id,
           NULL AS date,
           mem.name AS title,
           NULL AS ministry,
           NULL AS category,
           NULL AS item_type,
           NULL AS speakers,
           mem.summary AS body,
           NULL AS source_url
    FROM members mem
"#;

const MINISTRIES_SELECT: &str = r#"
    SELECT mi.id AS id,
           NULL AS date,
           mi.name AS title,
           mi.acronym AS ministry,
           NULL AS category,
           NULL AS item_type,
           NULL AS speakers,
           NULL AS body,
           NULL AS source_url
    FROM ministries mi
"#;

fn base_select(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Sessions => SESSIONS_SELECT,
        ContentType::Sections => SECTIONS_SELECT,
        ContentType::Bills => BILLS_SELECT,
        ContentType::Members => MEMBERS_SELECT,
        ContentType::Ministries => MINISTRIES_SELECT,
    }
}

/// Table alias of the primary table inside [`base_select`].
fn alias(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Sessions => "s",
        ContentType::Sections => "sec",
        ContentType::Bills => "b",
        ContentType::Members => "mem",
        ContentType::Ministries => "mi",
    }
}

fn table(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Sessions => "sessions",
        ContentType::Sections => "sections",
        ContentType::Bills => "bills",
        ContentType::Members => "members",
        ContentType::Ministries => "ministries",
    }
}

/// Dated records newest first, undated ones alphabetically.
fn order_by(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Sessions => "ORDER BY s.date DESC, s.id",
        ContentType::Sections => "ORDER BY ses.date DESC, sec.section_order ASC, sec.id",
        ContentType::Bills => "ORDER BY date DESC, b.title",
        ContentType::Members => "ORDER BY mem.name",
        ContentType::Ministries => "ORDER BY mi.name",
    }
}

fn item_from_row(row: &SqliteRow) -> ListItem {
    let speakers: Option<String> = row.get("speakers");
    let body: Option<String> = row.get("body");

    ListItem {
        id: row.get("id"),
        date: row.get("date"),
        title: row.get("title"),
        ministry: row.get("ministry"),
        category: row.get("category"),
        item_type: row.get("item_type"),
        speakers: speakers
            .map(|s| {
                s.split('|')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty()),
        snippet: body
            .as_deref()
            .map(|b| truncate_snippet(b, SNIPPET_CHARS))
            .filter(|s| !s.is_empty()),
    }
}

/// Number of records of a content type.
pub async fn count(pool: &SqlitePool, content_type: ContentType) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table(content_type));
    let total: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(total)
}

/// One server-rendered browse page.
pub async fn list_page(
    pool: &SqlitePool,
    content_type: ContentType,
    pagination: Pagination,
) -> Result<Paginated<ListItem>> {
    let sql = format!(
        "{} {} LIMIT ? OFFSET ?",
        base_select(content_type),
        order_by(content_type)
    );

    let rows = sqlx::query(&sql)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    let total = count(pool, content_type).await?;

    Ok(Paginated {
        items: rows.iter().map(item_from_row).collect(),
        total,
        page: pagination.page,
        per_page: pagination.per_page,
    })
}

/// The full, unpaginated collection for a content type, in browse order.
pub async fn bulk(pool: &SqlitePool, content_type: ContentType) -> Result<BulkData> {
    let sql = format!("{} {}", base_select(content_type), order_by(content_type));
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    let items: Vec<ListItem> = rows.iter().map(item_from_row).collect();

    Ok(BulkData {
        total: items.len(),
        items,
    })
}

/// A record with its body text and related records, or `None` if no
/// record of that type has `id`.
pub async fn get_record(
    pool: &SqlitePool,
    content_type: ContentType,
    id: &str,
) -> Result<Option<RecordDetail>> {
    let sql = format!(
        "{} WHERE {}.id = ?",
        base_select(content_type),
        alias(content_type)
    );

    let row = match sqlx::query(&sql).bind(id).fetch_optional(pool).await? {
        Some(row) => row,
        None => return Ok(None),
    };

    let item = item_from_row(&row);
    let body: Option<String> = row.get("body");
    let source_url: Option<String> = row.get("source_url");

    let (related_type, related) = related_records(pool, content_type, id).await?;

    Ok(Some(RecordDetail {
        item,
        body,
        source_url,
        related_type,
        related,
    }))
}

async fn related_records(
    pool: &SqlitePool,
    content_type: ContentType,
    id: &str,
) -> Result<(ContentType, Vec<ListItem>)> {
    let (related_type, filter, binds) = match content_type {
        ContentType::Sessions => (ContentType::Sections, "WHERE sec.session_id = ?", 1),
        ContentType::Sections => (
            ContentType::Sections,
            "WHERE sec.session_id = (SELECT session_id FROM sections WHERE id = ?) AND sec.id != ?",
            2,
        ),
        ContentType::Bills => (ContentType::Sections, "WHERE sec.bill_id = ?", 1),
        ContentType::Members => (
            ContentType::Sections,
            "WHERE sec.id IN (SELECT section_id FROM section_speakers WHERE member_id = ?)",
            1,
        ),
        ContentType::Ministries => (ContentType::Bills, "WHERE b.ministry_id = ?", 1),
    };

    let sql = format!(
        "{} {} {}",
        base_select(related_type),
        filter,
        order_by(related_type)
    );

    let mut query = sqlx::query(&sql);
    for _ in 0..binds {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    Ok((related_type, rows.iter().map(item_from_row).collect()))
}

/// Rows fed to the search index: `(record_id, title, body)` for every
/// record of a content type. Speakers and ministry are folded into the
/// body so they are searchable.
pub async fn index_rows(
    pool: &SqlitePool,
    content_type: ContentType,
) -> Result<Vec<(String, String, String)>> {
    let sql = format!("{} {}", base_select(content_type), order_by(content_type));
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| {
            let item = item_from_row(row);
            let body: Option<String> = row.get("body");
            let mut text = body.unwrap_or_default();
            if let Some(ministry) = &item.ministry {
                text.push(' ');
                text.push_str(ministry);
            }
            if let Some(speakers) = &item.speakers {
                text.push(' ');
                text.push_str(&speakers.join(" "));
            }
            (item.id, item.title, text)
        })
        .collect())
}

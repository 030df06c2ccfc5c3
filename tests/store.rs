//! Record store, search index, local browser sources, and static export
//! against a seeded SQLite database.

mod common;

use std::sync::Arc;
use tempfile::TempDir;

use common::seeded_pool;
use hansard_browser::browser::history::MemoryHistory;
use hansard_browser::browser::{BrowserOptions, ListBrowser, Mode};
use hansard_browser::export::{export_to, PageDescriptor};
use hansard_browser::models::{BulkData, ContentType};
use hansard_browser::pagination::Pagination;
use hansard_browser::{local, records, search_index};

fn ids<T: AsRef<str>>(values: &[T]) -> Vec<&str> {
    values.iter().map(|v| v.as_ref()).collect()
}

#[tokio::test]
async fn list_page_orders_newest_first() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    let page = records::list_page(&pool, ContentType::Sessions, Pagination::new(1, 20))
        .await
        .unwrap();
    let got: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(got, vec!["s-march", "s-jan"]);
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].title, "Sitting No. 12");
    assert_eq!(page.items[0].date.as_deref(), Some("2024-03-15"));

    let second = records::list_page(&pool, ContentType::Sections, Pagination::new(2, 2))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, "sec-bill");
    assert_eq!(second.total_pages(), 2);
    assert_eq!(second.next_page(), None);
    assert_eq!(second.prev_page(), Some(1));
}

#[tokio::test]
async fn bulk_sections_carry_speakers_in_speaking_order() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    let data = records::bulk(&pool, ContentType::Sections).await.unwrap();
    assert_eq!(data.total, 3);

    let housing = &data.items[0];
    assert_eq!(housing.id, "sec-housing");
    assert_eq!(housing.ministry.as_deref(), Some("MND"));
    assert_eq!(housing.item_type.as_deref(), Some("oral_answer"));
    assert_eq!(
        housing.speakers.as_deref().map(ids),
        Some(vec!["Lim Hui", "Tan Wei Ming"])
    );
    assert_eq!(data.items[2].speakers, None);
}

#[tokio::test]
async fn bills_report_their_reading_stage() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    let data = records::bulk(&pool, ContentType::Bills).await.unwrap();
    assert_eq!(data.items.len(), 1);
    assert_eq!(data.items[0].category.as_deref(), Some("first_reading"));
    assert_eq!(data.items[0].date.as_deref(), Some("2024-01-10"));
}

#[tokio::test]
async fn get_record_includes_related_records() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    let related = |detail: &hansard_browser::models::RecordDetail| -> Vec<String> {
        detail.related.iter().map(|i| i.id.clone()).collect()
    };

    let session = records::get_record(&pool, ContentType::Sessions, "s-march")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.related_type, ContentType::Sections);
    assert_eq!(related(&session), vec!["sec-housing", "sec-budget"]);
    assert_eq!(
        session.source_url.as_deref(),
        Some("https://hansard.example/2024-03-15")
    );

    let section = records::get_record(&pool, ContentType::Sections, "sec-housing")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(related(&section), vec!["sec-budget"]);
    assert!(section.body.unwrap().contains("flat supply"));

    let member = records::get_record(&pool, ContentType::Members, "m-lim")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(related(&member), vec!["sec-housing"]);

    let ministry = records::get_record(&pool, ContentType::Ministries, "mnd")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ministry.related_type, ContentType::Bills);
    assert_eq!(related(&ministry), vec!["b-housing"]);

    let bill = records::get_record(&pool, ContentType::Bills, "b-housing")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(related(&bill), vec!["sec-bill"]);
}

#[tokio::test]
async fn get_record_missing_returns_none() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    let missing = records::get_record(&pool, ContentType::Bills, "nope")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn search_index_finds_and_resolves_matches() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;

    assert_eq!(search_index::entry_count(&pool).await.unwrap(), 0);
    assert_eq!(search_index::rebuild(&pool).await.unwrap(), 10);
    // Rebuilding replaces rather than appends.
    assert_eq!(search_index::rebuild(&pool).await.unwrap(), 10);

    let handles = search_index::search(&pool, "hous", ContentType::Sections)
        .await
        .unwrap();
    assert_eq!(handles.len(), 2);

    let mut resolved = Vec::new();
    for handle in &handles {
        let fragment = search_index::resolve(&pool, handle).await.unwrap();
        resolved.push(fragment.record_id().unwrap().to_string());
    }
    resolved.sort();
    assert_eq!(resolved, vec!["sec-bill", "sec-housing"]);

    let by_speaker = search_index::search(&pool, "Lim", ContentType::Sections)
        .await
        .unwrap();
    assert_eq!(by_speaker.len(), 1);

    let empty = search_index::resolve(&pool, "not-a-handle").await.unwrap();
    assert_eq!(empty.record_id(), None);
}

#[tokio::test]
async fn local_browser_falls_back_until_indexed() {
    let tmp = TempDir::new().unwrap();
    let (cfg, pool) = seeded_pool(&tmp).await;

    let build = || {
        let options = BrowserOptions::new(ContentType::Sections, "local")
            .with_config(&cfg.browser)
            .with_initial_page(Vec::new(), 3);
        ListBrowser::new(
            options,
            local::sources(&pool, ContentType::Sections),
            Arc::new(MemoryHistory::new()),
        )
    };

    let unindexed = build();
    unindexed.mount("?q=housing").await;
    let view = unindexed.view();
    assert_eq!(view.mode, Mode::Search);
    assert_eq!(view.total, 2);

    search_index::rebuild(&pool).await.unwrap();
    let indexed = build();
    indexed.mount("?q=debate").await;
    let view = indexed.view();
    assert_eq!(view.total, 1);
    assert_eq!(view.items[0].id, "sec-budget");
    assert_eq!(view.status_text, "1 result for \"debate\"");

    indexed
        .set_date_range(Some("2024-01-01".into()), Some("2024-01-31".into()))
        .await;
    assert_eq!(indexed.view().status_text, "No results found");

    indexed.clear_query().await;
    let view = indexed.view();
    assert_eq!(view.mode, Mode::DateFilter);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, "sec-bill");
}

#[tokio::test]
async fn export_writes_datasets_and_page_descriptors() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;
    let out = tmp.path().join("site");

    let summary = export_to(&pool, &out, 2).await.unwrap();
    assert_eq!(summary.collections.len(), 5);

    let sections: BulkData =
        serde_json::from_str(&std::fs::read_to_string(out.join("data/sections.json")).unwrap())
            .unwrap();
    assert_eq!(sections.total, 3);

    let raw = std::fs::read_to_string(out.join("pages/sections.json")).unwrap();
    assert!(raw.contains("\"totalCount\": 3"));
    let descriptor: PageDescriptor = serde_json::from_str(&raw).unwrap();
    assert_eq!(descriptor.page_size, 2);
    assert_eq!(descriptor.initial_items.len(), 2);
    assert_eq!(descriptor.initial_items[0].id, "sec-housing");
}

//! HTTP API end-to-end, plus a list browser driven over the HTTP sources.

mod common;

use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

use common::seeded_pool;
use hansard_browser::browser::history::MemoryHistory;
use hansard_browser::browser::{BrowserOptions, ListBrowser, Mode};
use hansard_browser::config::RemoteConfig;
use hansard_browser::models::ContentType;
use hansard_browser::remote::Remote;
use hansard_browser::{search_index, server};

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn_server(pool: sqlx::SqlitePool) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(pool)).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn get_json(client: &reqwest::Client, url: &str) -> (u16, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn api_serves_pages_records_and_datasets() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;
    let base = spawn_server(pool).await;
    let client = reqwest::Client::new();

    let (status, health) = get_json(&client, &format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_eq!(health["status"], "ok");

    let (status, page) =
        get_json(&client, &format!("{}/api/sections?page=1&per_page=2", base)).await;
    assert_eq!(status, 200);
    assert_eq!(page["total"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["speakers"][0], "Lim Hui");

    let (status, detail) = get_json(&client, &format!("{}/api/bills/b-housing", base)).await;
    assert_eq!(status, 200);
    assert_eq!(detail["title"], "Housing Amendment Bill");
    assert_eq!(detail["related"][0]["id"], "sec-bill");

    let (status, bulk) = get_json(&client, &format!("{}/data/members.json", base)).await;
    assert_eq!(status, 200);
    assert_eq!(bulk["total"], 2);
}

#[tokio::test]
async fn api_errors_follow_the_error_contract() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;
    let base = spawn_server(pool).await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &format!("{}/api/votes", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = get_json(&client, &format!("{}/api/bills/missing", base)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = get_json(&client, &format!("{}/search?q=&type=bills", base)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = get_json(&client, &format!("{}/search/meta", base)).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "index_unavailable");
}

#[tokio::test]
async fn search_endpoints_return_handles_that_resolve() {
    let tmp = TempDir::new().unwrap();
    let (_cfg, pool) = seeded_pool(&tmp).await;
    search_index::rebuild(&pool).await.unwrap();
    let base = spawn_server(pool).await;
    let client = reqwest::Client::new();

    let (status, meta) = get_json(&client, &format!("{}/search/meta", base)).await;
    assert_eq!(status, 200);
    assert_eq!(meta["entries"], 10);

    let (status, found) =
        get_json(&client, &format!("{}/search?q=budget&type=sections", base)).await;
    assert_eq!(status, 200);
    let results = found["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);

    let handle = results[0]["handle"].as_str().unwrap();
    let (status, fragment) = get_json(&client, &format!("{}/fragment/{}", base, handle)).await;
    assert_eq!(status, 200);
    assert_eq!(fragment["meta"]["id"], "sec-budget");
}

#[tokio::test]
async fn remote_browser_searches_and_filters_over_http() {
    let tmp = TempDir::new().unwrap();
    let (cfg, pool) = seeded_pool(&tmp).await;
    search_index::rebuild(&pool).await.unwrap();
    let base = spawn_server(pool).await;

    let remote = Remote::new(&RemoteConfig {
        base_url: base,
        timeout_secs: 5,
    })
    .unwrap();
    let first = remote.first_page(ContentType::Sections, 2).await.unwrap();
    let options = BrowserOptions::new(ContentType::Sections, remote.data_url(ContentType::Sections))
        .with_config(&cfg.browser)
        .with_initial_page(first.items, first.total as usize);
    let history = Arc::new(MemoryHistory::new());
    let browser = ListBrowser::new(
        options,
        remote.sources(ContentType::Sections).unwrap(),
        history.clone(),
    );

    browser.mount("").await;
    assert_eq!(browser.view().status_text, "Showing 1-2 of 3");

    browser.set_page(2).await;
    assert_eq!(browser.view().items[0].id, "sec-bill");

    browser.set_query("housing").await;
    let view = browser.view();
    assert_eq!(view.mode, Mode::Search);
    assert_eq!(view.total, 2);
    assert_eq!(view.total_pages, 1);

    browser
        .set_date_range(Some("2024-03-01".into()), None)
        .await;
    let view = browser.view();
    assert_eq!(view.mode, Mode::SearchDateFilter);
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, "sec-housing");
    assert_eq!(history.current(), "q=housing&from=2024-03-01");
}

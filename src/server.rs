//! HTTP API for list pages, bulk datasets, and the search index.
//!
//! Static-site pages embed a list browser that talks to these endpoints
//! cross-origin, so CORS permits everything.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/{type}?page&per_page` | One browse page |
//! | `GET`  | `/api/{type}/{id}` | A record with related records |
//! | `GET`  | `/data/{type}.json` | The full collection `{ items, total }` |
//! | `GET`  | `/search?q&type` | Ordered match handles |
//! | `GET`  | `/search/meta` | Index probe; 503 while the index is empty |
//! | `GET`  | `/fragment/{handle}` | Resolve a match handle |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "unknown content type: votes" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `index_unavailable` (503), `internal` (500).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::{BulkData, ContentType, Fragment, ListItem, RecordDetail};
use crate::pagination::{Paginated, PaginationParams};
use crate::{db, records, search_index};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    pool: SqlitePool,
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let bind_addr = config.server.bind.clone();

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "hansard server listening");
    println!("Hansard server listening on http://{}", bind_addr);

    axum::serve(listener, router(pool)).await?;
    Ok(())
}

/// The full route table over a connection pool.
pub fn router(pool: SqlitePool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/{content_type}", get(handle_list))
        .route("/api/{content_type}/{id}", get(handle_get))
        .route("/data/{file}", get(handle_bulk))
        .route("/search", get(handle_search))
        .route("/search/meta", get(handle_search_meta))
        .route("/fragment/{handle}", get(handle_fragment))
        .layer(cors)
        .with_state(AppState { pool })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn parse_type(raw: &str) -> Result<ContentType, AppError> {
    raw.parse::<ContentType>()
        .map_err(|_| not_found(format!("unknown content type: {}", raw)))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Records ============

async fn handle_list(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<ListItem>>, AppError> {
    let content_type = parse_type(&content_type)?;
    let page = records::list_page(&state.pool, content_type, params.into()).await?;
    Ok(Json(page))
}

async fn handle_get(
    State(state): State<AppState>,
    Path((content_type, id)): Path<(String, String)>,
) -> Result<Json<RecordDetail>, AppError> {
    let content_type = parse_type(&content_type)?;
    records::get_record(&state.pool, content_type, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("no {} record with id: {}", content_type, id)))
}

/// `GET /data/{type}.json`
async fn handle_bulk(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Json<BulkData>, AppError> {
    let name = file
        .strip_suffix(".json")
        .ok_or_else(|| not_found(format!("no dataset named {}", file)))?;
    let content_type = parse_type(name)?;
    Ok(Json(records::bulk(&state.pool, content_type).await?))
}

// ============ Search ============

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
}

#[derive(Serialize)]
struct SearchHit {
    handle: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }
    let content_type = params
        .content_type
        .ok_or_else(|| bad_request("type is required"))?;
    let content_type = parse_type(&content_type)?;

    let handles = search_index::search(&state.pool, &query, content_type).await?;
    Ok(Json(SearchResponse {
        results: handles
            .into_iter()
            .map(|handle| SearchHit { handle })
            .collect(),
    }))
}

#[derive(Serialize)]
struct SearchMeta {
    entries: i64,
}

async fn handle_search_meta(State(state): State<AppState>) -> Result<Json<SearchMeta>, AppError> {
    let entries = search_index::entry_count(&state.pool).await?;
    if entries == 0 {
        return Err(AppError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "index_unavailable".to_string(),
            message: "search index is empty".to_string(),
        });
    }
    Ok(Json(SearchMeta { entries }))
}

async fn handle_fragment(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Fragment>, AppError> {
    Ok(Json(search_index::resolve(&state.pool, &handle).await?))
}

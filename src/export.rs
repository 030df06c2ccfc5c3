//! Static export for hosting list pages without a server.
//!
//! For every content type writes:
//!
//! - `data/{type}.json`: the bulk dataset `{ items, total }`
//! - `pages/{type}.json`: the page descriptor a list browser is built from,
//!   `{ totalCount, pageSize, initialItems }`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;

use crate::config::Config;
use crate::db;
use crate::models::{ContentType, ListItem};
use crate::pagination::Pagination;
use crate::records;

/// Construction parameters for a list page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub total_count: usize,
    pub page_size: usize,
    pub initial_items: Vec<ListItem>,
}

/// Counts per content type, in export order.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub collections: Vec<(ContentType, usize)>,
}

pub async fn run_export(config: &Config, output: &Path) -> Result<()> {
    let pool = db::connect(config).await?;
    let summary = export_to(&pool, output, config.browser.page_size).await?;

    for (content_type, total) in &summary.collections {
        eprintln!("Exported {} {} records", total, content_type);
    }
    eprintln!("Wrote {}", output.display());

    pool.close().await;
    Ok(())
}

/// Write every collection under `output`.
pub async fn export_to(pool: &SqlitePool, output: &Path, page_size: usize) -> Result<ExportSummary> {
    let data_dir = output.join("data");
    let pages_dir = output.join("pages");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    std::fs::create_dir_all(&pages_dir)
        .with_context(|| format!("Failed to create {}", pages_dir.display()))?;

    let first_page = Pagination::new(1, u32::try_from(page_size).unwrap_or(u32::MAX));
    let mut summary = ExportSummary::default();

    for content_type in ContentType::ALL {
        let data = records::bulk(pool, content_type).await?;
        let page = records::list_page(pool, content_type, first_page).await?;

        let descriptor = PageDescriptor {
            total_count: data.total,
            page_size: page.per_page as usize,
            initial_items: page.items,
        };

        let file = format!("{}.json", content_type);
        write_json(&data_dir.join(&file), &data)?;
        write_json(&pages_dir.join(&file), &descriptor)?;

        tracing::debug!(%content_type, total = data.total, "exported collection");
        summary.collections.push((content_type, data.total));
    }

    Ok(summary)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

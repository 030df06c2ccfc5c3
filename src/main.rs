//! # Hansard CLI (`hansard`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hansard init` | Create the SQLite database and run schema migrations |
//! | `hansard index` | Rebuild the full-text search index |
//! | `hansard list <type>` | Print one server-side page of records |
//! | `hansard get <type> <id>` | Print a record with its related records |
//! | `hansard browse <type>` | Drive a list browser and print its view |
//! | `hansard export` | Write static JSON datasets and page descriptors |
//! | `hansard serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! hansard browse sections --url "?q=housing&page=2"
//! hansard browse sessions --from 2024-01-01 --to 2024-03-31
//! hansard browse bills --query cpf --remote
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use hansard_browser::browser::history::MemoryHistory;
use hansard_browser::browser::render::render_card;
use hansard_browser::browser::{url_state, BrowserOptions, ListBrowser};
use hansard_browser::config::{self, Config};
use hansard_browser::models::ContentType;
use hansard_browser::pagination::{Pagination, DEFAULT_PER_PAGE};
use hansard_browser::remote::Remote;
use hansard_browser::{db, export, local, migrate, records, search_index, server, tracing_setup};

/// Hansard browser: parliamentary records with paginated search.
#[derive(Parser)]
#[command(name = "hansard", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/hansard.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Rebuild the full-text search index from all records.
    Index,

    /// Print one page of records, newest first.
    List {
        /// Content type: sessions, sections, bills, members, ministries.
        content_type: ContentType,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },

    /// Print a record with its body and related records.
    Get {
        content_type: ContentType,
        id: String,
    },

    /// Build a list browser, apply the given interactions, and print the
    /// resulting URL and view.
    ///
    /// Interactions apply after `--url` in this order: query, dates, page.
    Browse {
        content_type: ContentType,

        /// Starting URL or query string, e.g. `?q=housing&page=2`.
        #[arg(long, default_value = "")]
        url: String,

        #[arg(long)]
        query: Option<String>,

        #[arg(long)]
        page: Option<usize>,

        /// Lower date bound (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,

        /// Upper date bound (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,

        /// Read from `[remote].base_url` instead of the local database.
        #[arg(long)]
        remote: bool,
    },

    /// Export bulk datasets and page descriptors as static JSON.
    Export {
        #[arg(long, default_value = "./site")]
        output: PathBuf,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init_tracing(cli.debug)?;

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
        Config::minimal()
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized at {}", cfg.db.path.display());
        }
        Commands::Index => {
            let pool = db::connect(&cfg).await?;
            let entries = search_index::rebuild(&pool).await?;
            println!("Indexed {} records", entries);
            pool.close().await;
        }
        Commands::List {
            content_type,
            page,
            per_page,
        } => {
            let pool = db::connect(&cfg).await?;
            let page = records::list_page(&pool, content_type, Pagination::new(page, per_page))
                .await?;
            for item in &page.items {
                println!("{}\n", render_card(content_type, item));
            }
            println!(
                "Page {} of {} ({} {})",
                page.page,
                page.total_pages(),
                page.total,
                content_type
            );
            if let Some(prev) = page.prev_page() {
                println!("Previous: hansard list {} --page {}", content_type, prev);
            }
            if let Some(next) = page.next_page() {
                println!("Next: hansard list {} --page {}", content_type, next);
            }
            pool.close().await;
        }
        Commands::Get { content_type, id } => {
            let pool = db::connect(&cfg).await?;
            match records::get_record(&pool, content_type, &id).await? {
                Some(detail) => {
                    println!("{}", render_card(content_type, &detail.item));
                    if let Some(url) = &detail.source_url {
                        println!("Source: {}", url);
                    }
                    if let Some(body) = &detail.body {
                        println!("\n{}", body);
                    }
                    if !detail.related.is_empty() {
                        println!("\nRelated {}:", detail.related_type);
                        for item in &detail.related {
                            println!("  - {} ({})", item.title, item.id);
                        }
                    }
                }
                None => anyhow::bail!("No {} record with id: {}", content_type, id),
            }
            pool.close().await;
        }
        Commands::Browse {
            content_type,
            url,
            query,
            page,
            from,
            to,
            remote,
        } => {
            let page_size = cfg.browser.page_size;
            let (options, sources) = if remote {
                let remote = Remote::new(&cfg.remote)?;
                let first = remote.first_page(content_type, page_size).await?;
                let options = BrowserOptions::new(content_type, remote.data_url(content_type))
                    .with_config(&cfg.browser)
                    .with_initial_page(first.items, first.total.max(0) as usize);
                (options, remote.sources(content_type)?)
            } else {
                let pool = db::connect(&cfg).await?;
                let per_page = u32::try_from(page_size).unwrap_or(DEFAULT_PER_PAGE);
                let first =
                    records::list_page(&pool, content_type, Pagination::new(1, per_page)).await?;
                let options =
                    BrowserOptions::new(content_type, cfg.db.path.display().to_string())
                        .with_config(&cfg.browser)
                        .with_initial_page(first.items, first.total.max(0) as usize);
                (options, local::sources(&pool, content_type))
            };

            let browser = ListBrowser::new(options, sources, Arc::new(MemoryHistory::new()));

            browser.mount(&url).await;
            if let Some(query) = query {
                browser.set_query(query).await;
            }
            if from.is_some() || to.is_some() {
                if !content_type.is_dated() {
                    tracing::warn!(
                        %content_type,
                        "records of this type have no dates, a date range excludes all of them"
                    );
                }
                let state = browser.state();
                browser
                    .set_date_range(from.or(state.date_from), to.or(state.date_to))
                    .await;
            }
            if let Some(page) = page {
                browser.set_page(page).await;
            }

            let path = format!("/{}", content_type);
            println!("{}", url_state::location(&path, &browser.state()));
            println!();
            print!("{}", browser.render());
        }
        Commands::Export { output } => {
            export::run_export(&cfg, &output).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

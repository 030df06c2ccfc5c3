//! # Hansard Browser
//!
//! Browse parliamentary records (sittings, sections, bills, members, and
//! ministries) with pagination, free-text search, and date filtering.
//!
//! Records live in SQLite. An FTS5 table serves as the search index. The
//! [`browser::ListBrowser`] drives one list view: it derives its mode from
//! query, page, and date bounds, keeps that state in the URL, loads the bulk
//! dataset at most once, resolves search matches lazily a window at a time,
//! and discards results that a newer interaction has overtaken.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────┐
//! │  SQLite  │──▶│ records /    │──▶│ HTTP API     │
//! │ + FTS5   │   │ search_index │   │ static export│
//! └──────────┘   └──────┬───────┘   └──────┬───────┘
//!                       │ local            │ remote
//!                       ▼                  ▼
//!                    ┌───────────────────────┐
//!                    │     ListBrowser       │
//!                    └───────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hansard init                          # create database
//! hansard index                         # build the search index
//! hansard browse sections --query housing --from 2024-01-01
//! hansard serve                         # start HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`pagination`] | Server-side pagination |
//! | [`records`] | Record queries: pages, bulk, detail |
//! | [`search_index`] | FTS5 index build, search, resolve |
//! | [`browser`] | The list browser state machine |
//! | [`local`] | Browser sources over the database |
//! | [`remote`] | Browser sources over the HTTP API |
//! | [`server`] | HTTP API |
//! | [`export`] | Static JSON export |

pub mod browser;
pub mod config;
pub mod db;
pub mod export;
pub mod local;
pub mod migrate;
pub mod models;
pub mod pagination;
pub mod records;
pub mod remote;
pub mod search_index;
pub mod server;
pub mod tracing_setup;

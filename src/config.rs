use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Tuning for the list browser.
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_prefetch_pages")]
    pub prefetch_pages: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            prefetch_pages: default_prefetch_pages(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_page_size() -> usize {
    20
}
fn default_prefetch_pages() -> usize {
    2
}
fn default_debounce_ms() -> u64 {
    150
}

/// Where `hansard browse --remote` finds a running server.
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Configuration used when no file is present: a local database under
    /// `./data` and default browser tuning.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/hansard.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:8080".to_string(),
            },
            browser: BrowserConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.browser.page_size == 0 {
        anyhow::bail!("browser.page_size must be > 0");
    }

    if config.browser.page_size > 100 {
        anyhow::bail!("browser.page_size must be <= 100");
    }

    if config.remote.timeout_secs == 0 {
        anyhow::bail!("remote.timeout_secs must be > 0");
    }

    if !config.remote.base_url.starts_with("http://")
        && !config.remote.base_url.starts_with("https://")
    {
        anyhow::bail!(
            "remote.base_url must be an http(s) URL, got '{}'",
            config.remote.base_url
        );
    }

    Ok(())
}

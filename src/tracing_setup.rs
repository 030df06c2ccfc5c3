//! Tracing setup for the `hansard` binary.
//!
//! ```text
//! hansard --debug ...               # debug logging to stderr
//! RUST_LOG=hansard_browser=trace    # fine-grained control
//! ```

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `debug` when set.
pub fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

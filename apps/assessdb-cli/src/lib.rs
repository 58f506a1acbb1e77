//! Shared plumbing for the indexer, search and server binaries.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use assessdb_core::config::{Config, Settings};

pub mod api;
pub mod page;

/// Console logging; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub fn load_settings() -> Result<Settings> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    config.settings()
}

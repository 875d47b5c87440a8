//! Command implementations.

pub mod check;
pub mod export;
pub mod import;
pub mod recover;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use visualmath_core::Config;
use visualmath_store::SqliteStore;

/// Load the configuration, applying a `--database` override.
///
/// A missing configuration file falls back to defaults plus `VISUALMATH__*`
/// environment variables.
pub fn load_config(config_path: &Path, database: Option<&Path>) -> Result<Config> {
    if !config_path.exists() {
        tracing::info!(?config_path, "configuration file not found, using defaults");
    }

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    if let Some(path) = database {
        tracing::info!(?path, "Overriding database path from CLI");
        config.database.path = path.to_path_buf();
    }

    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Open the configured SQLite database.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.database.path).wrap_err_with(|| {
        format!(
            "Failed to open database {}",
            config.database.path.display()
        )
    })
}

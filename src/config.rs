//! Process configuration, resolved once at startup.

use std::path::PathBuf;

use crate::error::{CatalogError, Result};

pub const ENV_DB_PATH: &str = "CATALOG_DB_PATH";
pub const ENV_LISTEN_ADDR: &str = "CATALOG_LISTEN_ADDR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "CATALOG_MAX_UPLOAD_BYTES";

/// Value of `CATALOG_DB_PATH` that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// DuckDB file; `None` keeps the catalog in memory.
    pub database_path: Option<PathBuf>,
    pub listen_addr: String,
    pub max_upload_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: Some(default_database_path()),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl CatalogConfig {
    /// Configuration for a throwaway in-memory catalog.
    pub fn in_memory() -> Self {
        Self {
            database_path: None,
            ..Self::default()
        }
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_path = match get(ENV_DB_PATH) {
            Some(v) if v == IN_MEMORY => None,
            Some(v) => Some(PathBuf::from(v)),
            None => Some(default_database_path()),
        };

        let listen_addr = get(ENV_LISTEN_ADDR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let max_upload_bytes = match get(ENV_MAX_UPLOAD_BYTES) {
            Some(v) => v.parse().map_err(|_| {
                CatalogError::Config(format!("{ENV_MAX_UPLOAD_BYTES} must be a byte count, got {v:?}"))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            database_path,
            listen_addr,
            max_upload_bytes,
        })
    }
}

/// Platform data directory for the catalog database
/// (e.g. `~/.local/share/price-catalog/catalog.duckdb` on Linux).
pub fn default_database_path() -> PathBuf {
    let dir = match dirs::data_dir() {
        Some(data) => data.join("price-catalog"),
        None => PathBuf::from(".price-catalog"),
    };
    dir.join("catalog.duckdb")
}

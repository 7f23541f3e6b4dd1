//! Async wrapper around [`PriceCatalog`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every catalog operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the event loop free while
//! DuckDB works.
//!
//! # Example
//!
//! ```no_run
//! use price_catalog::{AsyncPriceCatalog, CatalogConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = AsyncPriceCatalog::open(CatalogConfig::in_memory()).await.unwrap();
//!     let archive = catalog.export_archive().await.unwrap();
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::models::CatalogStats;
use crate::store::DuckDbStore;
use crate::PriceCatalog;

/// Async handle to a DuckDB-backed [`PriceCatalog`].
///
/// The catalog sits behind a [`Mutex`]; concurrent calls run one at a time,
/// which matches DuckDB's single-writer connection. Cloning the handle
/// shares the same catalog.
#[derive(Clone)]
pub struct AsyncPriceCatalog {
    inner: Arc<Mutex<PriceCatalog<DuckDbStore>>>,
}

impl AsyncPriceCatalog {
    /// Open the database named by `config` on the blocking pool.
    pub async fn open(config: CatalogConfig) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            let catalog = PriceCatalog::builder().config(&config).build()?;
            Ok(Self::from_catalog(catalog))
        })
        .await
        .map_err(join_error)?
    }

    pub fn from_catalog(catalog: PriceCatalog<DuckDbStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(catalog)),
        }
    }

    /// Run a sync catalog operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PriceCatalog<DuckDbStore>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let catalog = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = catalog
                .lock()
                .map_err(|_| CatalogError::Store("catalog lock poisoned".into()))?;
            f(&mut guard)
        })
        .await
        .map_err(join_error)?
    }

    /// Ingest an uploaded archive. See [`PriceCatalog::ingest`].
    pub async fn ingest(&self, archive: Vec<u8>, kind: Option<String>) -> Result<CatalogStats> {
        self.run(move |c| c.ingest(&archive, kind.as_deref())).await
    }

    pub async fn export_archive(&self) -> Result<Vec<u8>> {
        self.run(|c| c.export_archive()).await
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        self.run(|c| c.stats()).await
    }
}

fn join_error(e: tokio::task::JoinError) -> CatalogError {
    CatalogError::Store(format!("task join error: {e}"))
}

//! Price catalog ingestion and export.
//!
//! A catalog arrives as a zip or tar archive holding a CSV file with the
//! columns `id,name,category,price,create_date`. Ingestion locates the CSV,
//! validates every row, and loads the batch into DuckDB in one transaction,
//! returning store-wide statistics. Export reads the whole catalog back and
//! packs it as a zip with a single `data.csv` entry.
//!
//! # Quick start
//!
//! ```no_run
//! use price_catalog::PriceCatalog;
//!
//! let mut catalog = PriceCatalog::builder().in_memory().build().unwrap();
//!
//! let upload = std::fs::read("prices.zip").unwrap();
//! let stats = catalog.ingest(&upload, Some("zip")).unwrap();
//! println!("{} items in {} categories", stats.total_items, stats.total_categories);
//!
//! let archive = catalog.export_archive().unwrap();
//! ```
//!
//! The `id` column of an uploaded file is ignored: identity is always
//! assigned by the store, and exported files carry the store's ids.

pub mod archive;
#[cfg(feature = "async")]
pub mod async_client;
pub mod codec;
pub mod config;
pub mod error;
pub mod exporter;
pub mod loader;
pub mod models;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncPriceCatalog;
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use models::{ArchiveKind, CatalogStats, PriceRecord};
pub use store::{CatalogStore, DuckDbStore, MemoryStore, StoreTransaction};

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

// ---------------------------------------------------------------------------
// PriceCatalogBuilder
// ---------------------------------------------------------------------------

/// Builder for a DuckDB-backed [`PriceCatalog`].
///
/// Use [`PriceCatalog::builder()`] to obtain one.
pub struct PriceCatalogBuilder {
    database_path: Option<PathBuf>,
}

impl Default for PriceCatalogBuilder {
    fn default() -> Self {
        Self {
            database_path: Some(config::default_database_path()),
        }
    }
}

impl PriceCatalogBuilder {
    /// Store the catalog in the given DuckDB file.
    ///
    /// Defaults to [`config::default_database_path()`].
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the catalog in an in-memory database.
    pub fn in_memory(mut self) -> Self {
        self.database_path = None;
        self
    }

    /// Take the database location from a resolved configuration.
    pub fn config(mut self, config: &CatalogConfig) -> Self {
        self.database_path = config.database_path.clone();
        self
    }

    /// Open the database and bootstrap the schema.
    pub fn build(self) -> Result<PriceCatalog<DuckDbStore>> {
        let store = match self.database_path {
            Some(path) => DuckDbStore::open_path(path)?,
            None => DuckDbStore::open_in_memory()?,
        };
        Ok(PriceCatalog::with_store(store))
    }
}

// ---------------------------------------------------------------------------
// PriceCatalog
// ---------------------------------------------------------------------------

/// Ingestion and export entry points over a [`CatalogStore`].
pub struct PriceCatalog<S: CatalogStore = DuckDbStore> {
    store: S,
}

impl PriceCatalog<DuckDbStore> {
    pub fn builder() -> PriceCatalogBuilder {
        PriceCatalogBuilder::default()
    }
}

impl<S: CatalogStore> PriceCatalog<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Ingest an archive held in memory.
    ///
    /// `kind` is `"zip"` or `"tar"`; `None` or blank means zip. On error the
    /// store is left as it was, except for the caveat on
    /// [`CatalogError::Commit`].
    pub fn ingest(&mut self, upload: &[u8], kind: Option<&str>) -> Result<CatalogStats> {
        let kind = ArchiveKind::from_declared(kind)?;
        let csv = archive::locate_csv(upload, kind)?;
        self.ingest_csv(&csv)
    }

    /// Ingest an archive read from a stream. Tar is scanned without
    /// buffering the whole archive.
    pub fn ingest_reader<R: Read>(&mut self, reader: R, kind: Option<&str>) -> Result<CatalogStats> {
        let kind = ArchiveKind::from_declared(kind)?;
        let csv = archive::locate_csv_from_reader(reader, kind)?;
        self.ingest_csv(&csv)
    }

    fn ingest_csv(&mut self, csv: &[u8]) -> Result<CatalogStats> {
        debug!(bytes = csv.len(), "located csv payload");
        let rows = codec::parse_rows(csv)?;
        loader::load_and_aggregate(&rows, &mut self.store)
    }

    /// Every stored record, ordered by id.
    pub fn export_records(&self) -> Result<Vec<PriceRecord>> {
        exporter::export_all(&self.store)
    }

    /// The whole catalog as CSV bytes.
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        exporter::export_csv(&self.store)
    }

    /// The whole catalog as a zip holding `data.csv`.
    pub fn export_archive(&self) -> Result<Vec<u8>> {
        exporter::export_archive(&self.store)
    }

    /// Current store-wide statistics.
    pub fn stats(&self) -> Result<CatalogStats> {
        self.store.stats()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl<S: CatalogStore> fmt::Display for PriceCatalog<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.stats() {
            Ok(stats) => write!(
                f,
                "PriceCatalog(items={}, categories={}, total_price={})",
                stats.total_items, stats.total_categories, stats.total_price
            ),
            Err(_) => write!(f, "PriceCatalog(unavailable)"),
        }
    }
}

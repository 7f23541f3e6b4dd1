//! Store capabilities the pipeline depends on.
//!
//! The loader and exporter only see these two traits, so they run the same
//! against DuckDB and against the in-memory store used in tests.

pub mod duckdb_store;
pub mod memory;

pub use duckdb_store::DuckDbStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{CatalogStats, PriceRecord};

/// A relational store holding one row per [`PriceRecord`].
pub trait CatalogStore {
    /// Open a transaction. Writes made through it are invisible to other
    /// readers until [`StoreTransaction::commit`].
    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>>;

    /// Read every stored row, ordered by ascending identity.
    fn read_all(&self) -> Result<Vec<PriceRecord>>;

    /// Aggregate over the committed rows.
    fn stats(&self) -> Result<CatalogStats>;
}

/// An open store transaction. Dropping it without committing rolls back.
pub trait StoreTransaction {
    /// Insert a row and return the identity the store assigned to it.
    fn insert(&mut self, record: &PriceRecord) -> Result<i64>;

    /// Aggregate over every row visible inside this transaction, including
    /// its own uncommitted inserts.
    fn stats(&self) -> Result<CatalogStats>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;
}

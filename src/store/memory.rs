//! In-process catalog store.
//!
//! Rows live in a `Vec` in identity order. A transaction stages its inserts
//! and only appends them on commit. Faults can be injected at begin, at the
//! n-th insert of a transaction, at the in-transaction aggregate, or at
//! commit.

use std::collections::HashSet;

use crate::error::{CatalogError, Result};
use crate::models::{CatalogStats, PriceRecord};
use crate::store::{CatalogStore, StoreTransaction};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<PriceRecord>,
    next_id: i64,
    fail_begin: bool,
    fail_insert_at: Option<usize>,
    fail_stats: bool,
    fail_commit: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `begin` fail.
    pub fn fail_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Make the insert at zero-based position `n` of each transaction fail.
    pub fn fail_insert_at(mut self, n: usize) -> Self {
        self.fail_insert_at = Some(n);
        self
    }

    /// Make the aggregate inside a transaction fail. Stats over committed
    /// rows are unaffected.
    pub fn fail_stats(mut self) -> Self {
        self.fail_stats = true;
        self
    }

    /// Make every `commit` fail, leaving committed rows untouched.
    pub fn fail_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Committed rows in identity order.
    pub fn rows(&self) -> &[PriceRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CatalogStore for MemoryStore {
    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>> {
        if self.fail_begin {
            return Err(CatalogError::Store("begin refused".to_string()));
        }
        let next_id = self.next_id;
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged: Vec::new(),
            next_id,
        }))
    }

    fn read_all(&self) -> Result<Vec<PriceRecord>> {
        Ok(self.rows.clone())
    }

    fn stats(&self) -> Result<CatalogStats> {
        Ok(aggregate(self.rows.iter()))
    }
}

struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    staged: Vec<PriceRecord>,
    next_id: i64,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn insert(&mut self, record: &PriceRecord) -> Result<i64> {
        if self.store.fail_insert_at == Some(self.staged.len()) {
            return Err(CatalogError::Store(format!(
                "insert {} refused",
                self.staged.len()
            )));
        }
        self.next_id += 1;
        self.staged.push(record.clone().with_id(self.next_id));
        Ok(self.next_id)
    }

    fn stats(&self) -> Result<CatalogStats> {
        if self.store.fail_stats {
            return Err(CatalogError::Store("aggregate refused".to_string()));
        }
        Ok(aggregate(self.store.rows.iter().chain(self.staged.iter())))
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        if this.store.fail_commit {
            return Err(CatalogError::Store("commit refused".to_string()));
        }
        this.store.rows.extend(this.staged);
        this.store.next_id = this.next_id;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn aggregate<'a>(rows: impl Iterator<Item = &'a PriceRecord>) -> CatalogStats {
    let mut categories = HashSet::new();
    let mut stats = CatalogStats::default();
    for row in rows {
        stats.total_items += 1;
        stats.total_price += row.price;
        categories.insert(row.category.as_str());
    }
    stats.total_categories = categories.len() as i64;
    stats
}

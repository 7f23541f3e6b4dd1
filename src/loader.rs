//! All-or-nothing bulk load of parsed rows.

use tracing::{info, warn};

use crate::error::{CatalogError, Result};
use crate::models::{CatalogStats, PriceRecord};
use crate::store::{CatalogStore, StoreTransaction};

/// Insert `rows` in order inside one transaction and return the store-wide
/// stats computed just before commit.
///
/// Any insert or aggregate failure rolls the whole batch back. A failed
/// commit is reported as [`CatalogError::Commit`]; whether the store applied
/// the batch then depends on the engine, so callers must check the store
/// before retrying.
pub fn load_and_aggregate<S>(rows: &[PriceRecord], store: &mut S) -> Result<CatalogStats>
where
    S: CatalogStore + ?Sized,
{
    let mut tx = store
        .begin()
        .map_err(|e| CatalogError::Transaction(Box::new(e)))?;

    for (row, record) in rows.iter().enumerate() {
        if let Err(e) = tx.insert(record) {
            roll_back(tx);
            return Err(CatalogError::Insert {
                row,
                source: Box::new(e),
            });
        }
    }

    let stats = match tx.stats() {
        Ok(stats) => stats,
        Err(e) => {
            roll_back(tx);
            return Err(CatalogError::Aggregate(Box::new(e)));
        }
    };

    tx.commit().map_err(|e| CatalogError::Commit(Box::new(e)))?;

    info!(
        inserted = rows.len(),
        total_items = stats.total_items,
        total_categories = stats.total_categories,
        total_price = stats.total_price,
        "catalog batch committed"
    );
    Ok(stats)
}

fn roll_back(tx: Box<dyn StoreTransaction + '_>) {
    if let Err(e) = tx.rollback() {
        warn!(error = %e, "rollback failed");
    } else {
        warn!("catalog batch rolled back");
    }
}

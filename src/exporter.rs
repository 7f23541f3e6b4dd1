//! Export of the full catalog as a `data.csv` zip.

use tracing::info;

use crate::archive::wrap_as_zip;
use crate::codec::serialize_rows;
use crate::error::Result;
use crate::models::PriceRecord;
use crate::store::CatalogStore;

/// Every stored row, ordered by ascending id.
///
/// The whole catalog is materialized in memory.
pub fn export_all<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<PriceRecord>> {
    store.read_all()
}

/// Serialize the whole catalog to CSV bytes.
pub fn export_csv<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<u8>> {
    let records = export_all(store)?;
    serialize_rows(&records)
}

/// Serialize the whole catalog and wrap it as a single-entry zip.
pub fn export_archive<S: CatalogStore + ?Sized>(store: &S) -> Result<Vec<u8>> {
    let records = export_all(store)?;
    let csv = serialize_rows(&records)?;
    let archive = wrap_as_zip(&csv)?;
    info!(rows = records.len(), bytes = archive.len(), "catalog exported");
    Ok(archive)
}

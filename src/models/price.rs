use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PriceRecord — One catalog entry
// ---------------------------------------------------------------------------

/// A single validated catalog entry.
///
/// `id` is assigned by the store when the record is persisted. Records parsed
/// from an uploaded CSV never carry one, even when the file has an `id`
/// column: that column is ignored on ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub create_date: NaiveDate,
}

impl PriceRecord {
    /// Create a record with no store identity yet.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        create_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            price,
            create_date,
        }
    }

    /// Return a copy of this record carrying the given store identity.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Compare the business fields, ignoring identity.
    pub fn same_entry(&self, other: &PriceRecord) -> bool {
        self.name == other.name
            && self.category == other.category
            && self.price == other.price
            && self.create_date == other.create_date
    }
}

// ---------------------------------------------------------------------------
// CatalogStats — Store-wide aggregate snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogStats {
    pub total_items: i64,
    pub total_categories: i64,
    pub total_price: f64,
}

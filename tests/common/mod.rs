//! Shared fixtures for the price catalog integration tests.
//!
//! Builds small zip and tar archives in memory and provides sample records
//! and an in-memory DuckDB store.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use price_catalog::{DuckDbStore, PriceRecord};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const HEADER: &str = "id,name,category,price,create_date\n";

/// Build a zip whose entries appear in the given order.
pub fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a tar of regular files in the given order.
pub fn tar_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        append_file(&mut builder, name, data.as_bytes());
    }
    builder.into_inner().unwrap()
}

pub fn append_file(builder: &mut tar::Builder<Vec<u8>>, name: &str, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, name, data).unwrap();
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn record(name: &str, category: &str, price: f64, create_date: &str) -> PriceRecord {
    PriceRecord::new(name, category, price, date(create_date))
}

/// Three rows over two categories, totalling 40.49.
pub fn sample_records() -> Vec<PriceRecord> {
    vec![
        record("Widget", "Tools", 9.99, "2024-01-15"),
        record("Gadget", "Tools", 25.5, "2024-02-01"),
        record("Bolt", "Hardware", 5.0, "2023-12-31"),
    ]
}

pub fn sample_csv() -> Vec<u8> {
    format!(
        "{HEADER}\
         1,Widget,Tools,9.99,2024-01-15\n\
         2,Gadget,Tools,25.5,2024-02-01\n\
         3,Bolt,Hardware,5,2023-12-31\n"
    )
    .into_bytes()
}

pub fn duckdb_store() -> DuckDbStore {
    DuckDbStore::open_in_memory().unwrap()
}

pub fn row_count(store: &DuckDbStore) -> i64 {
    store
        .raw()
        .query_row("SELECT COUNT(*) FROM prices", [], |row| row.get(0))
        .unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

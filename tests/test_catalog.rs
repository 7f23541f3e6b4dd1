//! End-to-end ingest and export through the `PriceCatalog` facade.

mod common;

use price_catalog::archive::locate_csv;
use price_catalog::codec::{parse_rows, serialize_rows};
use price_catalog::{ArchiveKind, CatalogError, MemoryStore, PriceCatalog};

fn catalog() -> PriceCatalog {
    PriceCatalog::builder().in_memory().build().unwrap()
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[test]
fn ingest_zip_returns_stats() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);

    let stats = catalog.ingest(&upload, Some("zip")).unwrap();
    assert_eq!(stats.total_items, 3);
    assert_eq!(stats.total_categories, 2);
    common::assert_close(stats.total_price, 40.49);
}

#[test]
fn ingest_defaults_to_zip() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("prices.csv", "1,Widget,Tools,9.99,2024-01-15\n")]);
    assert_eq!(catalog.ingest(&upload, None).unwrap().total_items, 1);
}

#[test]
fn ingest_tar_stream() {
    let mut catalog = catalog();
    let upload = common::tar_of(&[
        ("a.csv", "1,Ignored,Nope,1,2024-01-01\n"),
        ("export/data.csv", "1,Widget,Tools,9.99,2024-01-15\n2,Lamp,Lighting,30,2024-01-16\n"),
    ]);

    let stats = catalog.ingest_reader(upload.as_slice(), Some("tar")).unwrap();
    assert_eq!(stats.total_items, 2);
    let names: Vec<String> = catalog
        .export_records()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Widget", "Lamp"]);
}

#[test]
fn unsupported_kind_fails_before_reading() {
    let mut catalog = catalog();
    let err = catalog.ingest(b"", Some("rar")).unwrap_err();
    assert!(matches!(err, CatalogError::UnsupportedArchiveType(_)));
    assert!(err.is_client_error());
}

#[test]
fn invalid_row_leaves_store_untouched() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);
    catalog.ingest(&upload, None).unwrap();

    let bad = common::zip_of(&[(
        "data.csv",
        "1,Hammer,Tools,12,2024-04-01\n2,Saw,Tools,abc,2024-04-01\n",
    )]);
    let err = catalog.ingest(&bad, None).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPrice { line: 2, .. }));
    assert_eq!(catalog.stats().unwrap().total_items, 3);
}

#[test]
fn ingest_into_memory_store() {
    let mut catalog = PriceCatalog::with_store(MemoryStore::new());
    let upload = common::zip_of(&[("data.csv", "1,Widget,Tools,9.99,2024-01-15\n")]);
    catalog.ingest(&upload, None).unwrap();
    assert_eq!(catalog.store().len(), 1);
    assert_eq!(
        catalog.to_string(),
        "PriceCatalog(items=1, categories=1, total_price=9.99)"
    );
}

#[test]
fn failed_insert_through_facade_keeps_prior_rows() {
    let mut catalog = PriceCatalog::with_store(MemoryStore::new().fail_insert_at(1));
    let one = common::zip_of(&[("data.csv", "1,Widget,Tools,9.99,2024-01-15\n")]);
    catalog.ingest(&one, None).unwrap();

    let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);
    let err = catalog.ingest(&upload, None).unwrap_err();
    assert!(matches!(err, CatalogError::Insert { row: 1, .. }));
    assert_eq!(catalog.store().len(), 1);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[test]
fn export_is_ordered_by_id() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);
    catalog.ingest(&upload, None).unwrap();
    catalog.ingest(&upload, None).unwrap();

    let ids: Vec<i64> = catalog
        .export_records()
        .unwrap()
        .iter()
        .map(|r| r.id.unwrap())
        .collect();
    assert_eq!(ids.len(), 6);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn export_of_empty_catalog_is_header_only() {
    let catalog = catalog();
    let archive = catalog.export_archive().unwrap();
    let csv = locate_csv(&archive, ArchiveKind::Zip).unwrap();
    assert_eq!(csv, common::HEADER.as_bytes());
}

#[test]
fn export_csv_carries_store_ids() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", "99,Widget,Tools,9.99,2024-01-15\n")]);
    catalog.ingest(&upload, None).unwrap();

    let csv = String::from_utf8(catalog.export_csv().unwrap()).unwrap();
    assert_eq!(csv, format!("{}1,Widget,Tools,9.99,2024-01-15\n", common::HEADER));
}

#[test]
fn repeated_export_is_byte_identical() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);
    catalog.ingest(&upload, None).unwrap();
    assert_eq!(catalog.export_archive().unwrap(), catalog.export_archive().unwrap());
}

#[test]
fn export_round_trips_through_ingest() {
    let records = common::sample_records();
    let mut source = catalog();
    let first_upload = common::zip_of(&[(
        "data.csv",
        std::str::from_utf8(&serialize_rows(&records).unwrap()).unwrap(),
    )]);
    source.ingest(&first_upload, None).unwrap();

    let exported = source.export_archive().unwrap();
    let decoded = parse_rows(locate_csv(&exported, ArchiveKind::Zip).unwrap().as_slice()).unwrap();
    assert_eq!(decoded.len(), records.len());
    for (original, back) in records.iter().zip(&decoded) {
        assert!(original.same_entry(back));
    }

    let mut target = catalog();
    let stats = target.ingest(&exported, Some("zip")).unwrap();
    assert_eq!(stats, source.stats().unwrap());
}

#[test]
fn export_keeps_extreme_dates() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[(
        "data.csv",
        "1,Relic,Antiques,1,0000-01-01\n2,Capsule,Future,2,9999-12-31\n",
    )]);
    catalog.ingest(&upload, None).unwrap();

    let dates: Vec<_> = catalog
        .export_records()
        .unwrap()
        .into_iter()
        .map(|r| r.create_date)
        .collect();
    assert_eq!(dates, vec![common::date("0000-01-01"), common::date("9999-12-31")]);

    let csv = String::from_utf8(catalog.export_csv().unwrap()).unwrap();
    assert!(csv.contains(",0000-01-01\n"));
    assert!(csv.contains(",9999-12-31\n"));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn file_backed_catalog_survives_reopen() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("nested").join("catalog.duckdb");

    {
        let mut catalog = PriceCatalog::builder().database_path(&path).build().unwrap();
        let upload = common::zip_of(&[("data.csv", std::str::from_utf8(&common::sample_csv()).unwrap())]);
        catalog.ingest(&upload, None).unwrap();
    }

    let catalog = PriceCatalog::builder().database_path(&path).build().unwrap();
    assert_eq!(catalog.stats().unwrap().total_items, 3);
    assert_eq!(catalog.export_records().unwrap()[0].name, "Widget");
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn stats_serialize_with_snake_case_keys() {
    let mut catalog = catalog();
    let upload = common::zip_of(&[("data.csv", "1,Widget,Tools,9.99,2024-01-15\n")]);
    let stats = catalog.ingest(&upload, None).unwrap();

    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "total_items": 1,
            "total_categories": 1,
            "total_price": 9.99
        })
    );
}

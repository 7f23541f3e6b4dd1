//! DuckDB-backed catalog store.
//!
//! Owns a single DuckDB connection (file-backed or in-memory) and bootstraps
//! the `prices` table on open. Identity comes from the `prices_id_seq`
//! sequence, so ids grow with insertion order.

use std::fs;
use std::path::Path;

use duckdb::{params, Connection as DuckDbConnection, Transaction};
use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::models::{CatalogStats, PriceRecord};
use crate::store::{CatalogStore, StoreTransaction};

const SCHEMA_SQL: &str = r#"
    CREATE SEQUENCE IF NOT EXISTS prices_id_seq START 1;
    CREATE TABLE IF NOT EXISTS prices (
        id BIGINT PRIMARY KEY DEFAULT nextval('prices_id_seq'),
        name VARCHAR NOT NULL,
        category VARCHAR NOT NULL,
        price DOUBLE NOT NULL,
        create_date DATE NOT NULL
    );
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO prices (name, category, price, create_date)
    VALUES (?, ?, ?, CAST(? AS DATE))
    RETURNING id
"#;

const STATS_SQL: &str = r#"
    SELECT
        COUNT(*) AS total_items,
        COUNT(DISTINCT category) AS total_categories,
        CAST(COALESCE(SUM(price), 0) AS DOUBLE) AS total_price
    FROM prices
"#;

const SELECT_ALL_SQL: &str = r#"
    SELECT id, name, category, price, create_date
    FROM prices
    ORDER BY id ASC
"#;

/// Catalog store on top of a DuckDB database.
pub struct DuckDbStore {
    conn: DuckDbConnection,
}

impl DuckDbStore {
    /// Open the database named by the configuration.
    ///
    /// `database_path: None` selects an in-memory database.
    pub fn open(config: &CatalogConfig) -> Result<Self> {
        match &config.database_path {
            Some(path) => Self::open_path(path),
            None => Self::open_in_memory(),
        }
    }

    /// Open (or create) a database file, creating parent directories.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening duckdb catalog");
        Self::from_connection(DuckDbConnection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(DuckDbConnection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the schema if it is missing.
    pub fn from_connection(conn: DuckDbConnection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

impl CatalogStore for DuckDbStore {
    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>> {
        let tx = self.conn.transaction()?;
        Ok(Box::new(DuckDbTransaction { tx }))
    }

    fn read_all(&self) -> Result<Vec<PriceRecord>> {
        let mut stmt = self.conn.prepare(SELECT_ALL_SQL)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(PriceRecord {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                category: row.get(2)?,
                price: row.get(3)?,
                create_date: row.get(4)?,
            });
        }
        Ok(out)
    }

    fn stats(&self) -> Result<CatalogStats> {
        query_stats(&self.conn)
    }
}

struct DuckDbTransaction<'a> {
    tx: Transaction<'a>,
}

impl StoreTransaction for DuckDbTransaction<'_> {
    fn insert(&mut self, record: &PriceRecord) -> Result<i64> {
        let date = record.create_date.format("%Y-%m-%d").to_string();
        let id: i64 = self.tx.query_row(
            INSERT_SQL,
            params![record.name, record.category, record.price, date],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn stats(&self) -> Result<CatalogStats> {
        query_stats(&self.tx)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx.commit()?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx.rollback()?;
        Ok(())
    }
}

fn query_stats(conn: &DuckDbConnection) -> Result<CatalogStats> {
    let stats = conn.query_row(STATS_SQL, [], |row| {
        Ok(CatalogStats {
            total_items: row.get(0)?,
            total_categories: row.get(1)?,
            total_price: row.get(2)?,
        })
    })?;
    Ok(stats)
}

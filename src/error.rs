use crate::models::ArchiveKind;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unsupported archive type: {0}")]
    UnsupportedArchiveType(String),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("csv file not found in {0}")]
    CsvNotFound(ArchiveKind),

    #[error("invalid csv data at line {line}: {reason}")]
    RowParse { line: u64, reason: String },

    #[error("invalid csv row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("invalid price at line {line}: {value:?}")]
    InvalidPrice { line: u64, value: String },

    #[error("invalid date at line {line}: {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("failed to begin transaction: {0}")]
    Transaction(#[source] Box<CatalogError>),

    #[error("failed to insert row {row}: {source}")]
    Insert {
        row: usize,
        #[source]
        source: Box<CatalogError>,
    },

    #[error("failed to compute catalog stats: {0}")]
    Aggregate(#[source] Box<CatalogError>),

    /// The store may or may not have applied the batch; verify its state
    /// before retrying.
    #[error("failed to commit data: {0}")]
    Commit(#[source] Box<CatalogError>),

    #[error("store error: {0}")]
    Store(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether the failure was caused by the submitted payload rather than by
    /// the store or the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CatalogError::UnsupportedArchiveType(_)
                | CatalogError::InvalidArchive(_)
                | CatalogError::CsvNotFound(_)
                | CatalogError::RowParse { .. }
                | CatalogError::InvalidRow { .. }
                | CatalogError::InvalidPrice { .. }
                | CatalogError::InvalidDate { .. }
                | CatalogError::Insert { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

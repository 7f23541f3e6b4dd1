/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The catalog, opened once at startup. Blocking DuckDB work is
    /// dispatched to the blocking thread pool by the wrapper.
    pub catalog: price_catalog::AsyncPriceCatalog,
}

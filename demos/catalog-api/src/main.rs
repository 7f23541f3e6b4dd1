mod error;
mod routes;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use price_catalog::{AsyncPriceCatalog, CatalogConfig};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CatalogConfig::from_env()?;
    match &config.database_path {
        Some(path) => info!(path = %path.display(), "opening catalog"),
        None => info!("opening in-memory catalog"),
    }
    let catalog = AsyncPriceCatalog::open(config.clone()).await?;

    let state = Arc::new(AppState { catalog });

    let app = Router::new()
        .route(
            "/api/v0/prices",
            post(routes::prices::upload_prices).get(routes::prices::download_prices),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("listening on http://{}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

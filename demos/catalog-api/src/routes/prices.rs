use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use price_catalog::{ArchiveKind, CatalogStats};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UploadParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// POST /api/v0/prices?type=zip
///
/// Ingest the archive sent in the multipart field `file` and return the
/// catalog totals after the load. `type` is `zip` (default) or `tar`.
pub async fn upload_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<CatalogStats>, AppError> {
    // Reject unknown kinds before reading the body.
    let kind = ArchiveKind::from_declared(params.kind.as_deref())?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("invalid multipart form: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("failed to read file: {e}")))?;
            upload = Some(bytes.to_vec());
            break;
        }
    }
    let upload = upload.ok_or_else(|| AppError::bad_request("missing file"))?;

    let stats = state
        .catalog
        .ingest(upload, Some(kind.as_str().to_string()))
        .await?;
    Ok(Json(stats))
}

/// GET /api/v0/prices
///
/// Download the whole catalog as `data.zip` holding `data.csv`.
pub async fn download_prices(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let archive = state.catalog.export_archive().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"data.zip\""),
        ],
        archive,
    )
        .into_response())
}

//! CSV export and import endpoints

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::ApiError;
use crate::csv;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Update records decoded from the CSV
    pub decoded: usize,
    /// Rows matched by filename and updated
    pub matched: usize,
    pub dirty_count: usize,
}

/// GET /api/export.csv
///
/// The whole row set as a CSV attachment with the fixed export filename
pub async fn export_csv(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    let body = csv::encode(store.rows());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv::EXPORT_FILENAME),
            ),
        ],
        body,
    )
        .into_response()
}

/// POST /api/import
///
/// CSV text in the body. Updates are matched by exact filename; blank cells
/// are skipped so they never erase existing tags. Unmatched filenames are
/// ignored.
pub async fn import_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Empty CSV body".to_string()));
    }
    let updates = csv::decode(&body);

    let mut store = state.store.write().await;
    let matched = store.apply_updates(&updates);
    info!(decoded = updates.len(), matched, "CSV import complete");
    Ok(Json(ImportResponse {
        decoded: updates.len(),
        matched,
        dirty_count: store.dirty_count(),
    }))
}

//! Axum route handler for the timesheet export.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::timesheet::export_timesheet;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// POST /api/export-timesheet
///
/// Body is `{header, rows}`; responds with the filled workbook as a download.
pub async fn handle_export_timesheet(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let template = state.template.clone();
    let exported = tokio::task::spawn_blocking(move || export_timesheet(&template, &body))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Export task failed: {e}")))??;

    info!(
        "Exported {} ({} bytes)",
        exported.filename,
        exported.bytes.len()
    );

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        exported.filename
    ))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid filename header: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    )
        .into_response())
}

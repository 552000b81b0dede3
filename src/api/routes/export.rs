//! Export Routes
//!
//! Spreadsheet download of the shared dataset.
//!
//! - GET /api/v1/export - CSV attachment

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::DatasetParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::export::{to_csv_string, SPREADSHEET_FILENAME};

/// GET /api/v1/export
///
/// Rows follow collection order, like the dashboard's spreadsheet button.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
) -> ApiResult<Response> {
    let (board, source) = state.load_board(params.data.as_deref());
    let body = to_csv_string(board.records())?;

    tracing::info!(
        records = board.len(),
        source = source.label(),
        "Exported spreadsheet"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", SPREADSHEET_FILENAME),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

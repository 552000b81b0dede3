//! Record Routes
//!
//! The dataset travels in the `data` query parameter; every change answers
//! with the new token and share link.
//!
//! - GET /api/v1/records - List records, optionally for one month
//! - POST /api/v1/records - Create a record
//! - DELETE /api/v1/records/:id - Delete a record

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{DatasetParams, DatasetResponse, RecordChangeResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::board::NewRecord;

/// GET /api/v1/records
///
/// With `month`, only that month's records, newest day first.
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
) -> ApiResult<Json<DatasetResponse>> {
    let (board, source) = state.load_board(params.data.as_deref());

    let response = match params.month()? {
        Some(month) => {
            let rows = board.table(month).into_iter().cloned().collect();
            DatasetResponse::with_records(&board, source, &state.share, rows)?
        }
        None => DatasetResponse::build(&board, source, &state.share)?,
    };

    Ok(Json(response))
}

/// POST /api/v1/records
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
    Json(input): Json<NewRecord>,
) -> ApiResult<(StatusCode, Json<RecordChangeResponse>)> {
    let (mut board, source) = state.load_board(params.data.as_deref());

    let record = board.add(input, Utc::now());
    let dataset = DatasetResponse::build(&board, source, &state.share)?;

    Ok((StatusCode::CREATED, Json(RecordChangeResponse { record, dataset })))
}

/// DELETE /api/v1/records/:id
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DatasetParams>,
) -> ApiResult<Json<RecordChangeResponse>> {
    let (mut board, source) = state.load_board(params.data.as_deref());

    let record = board.delete(&id)?;
    let dataset = DatasetResponse::build(&board, source, &state.share)?;

    Ok(Json(RecordChangeResponse { record, dataset }))
}

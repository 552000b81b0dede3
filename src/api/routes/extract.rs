//! Extraction Routes
//!
//! - POST /api/v1/extract - Read a record from an image-analysis reply

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{DatasetParams, DatasetResponse, ExtractRequest, ExtractResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::extract::parse_ai_response;

/// POST /api/v1/extract
///
/// Without `append` only the parsed values come back, for review before
/// saving. With it the record is added to the dataset in `data`.
pub async fn extract_record(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
    Json(req): Json<ExtractRequest>,
) -> ApiResult<Json<ExtractResponse>> {
    let now = Utc::now();
    let extracted = parse_ai_response(&req.text, now.date_naive())?;

    if !req.append {
        return Ok(Json(ExtractResponse {
            extracted,
            record: None,
            dataset: None,
        }));
    }

    let (mut board, source) = state.load_board(params.data.as_deref());
    let record = board.add(extracted.clone(), now);
    let dataset = DatasetResponse::build(&board, source, &state.share)?;

    Ok(Json(ExtractResponse {
        extracted,
        record: Some(record),
        dataset: Some(dataset),
    }))
}

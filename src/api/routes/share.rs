//! Share Routes
//!
//! - POST /api/v1/share/encode - Records to token and link
//! - POST /api/v1/share/decode - Token or link to records

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{DecodeRequest, DecodeResponse, EncodeRequest, EncodeResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::board::TriageBoard;
use crate::share;

/// POST /api/v1/share/encode
///
/// Rejects records whose total disagrees with their counts.
pub async fn encode_records(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EncodeRequest>,
) -> ApiResult<Json<EncodeResponse>> {
    let board = TriageBoard::new(req.records);
    board.validate()?;

    let token = board.to_token()?;
    let share_url = state.share.link_for(&token);

    Ok(Json(EncodeResponse {
        link_length: share_url.chars().count(),
        token,
        share_url,
    }))
}

/// POST /api/v1/share/decode
///
/// Unlike dataset endpoints this does not fall back to the sample dataset.
pub async fn decode_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecodeRequest>,
) -> ApiResult<Json<DecodeResponse>> {
    let token = share::token_from_link(&req.token, &state.share.param)
        .ok_or_else(|| ApiError::Validation("token is empty".to_string()))?;

    let decoded = share::decode(&token)?;

    Ok(Json(DecodeResponse {
        format: decoded.format,
        legacy: decoded.format.is_legacy(),
        records: decoded.records,
    }))
}

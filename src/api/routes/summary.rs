//! Summary Routes
//!
//! - GET /api/v1/summary - Month list and one month's aggregates
//! - GET /api/v1/compare - Selected records side by side
//! - GET /api/v1/categories - Risk category legend

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CategoryResponse, CompareResponse, DatasetParams, SummaryResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::board::RiskCategory;

/// GET /api/v1/summary
///
/// Summarizes `month`, or the latest month with records when omitted.
pub async fn month_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
) -> ApiResult<Json<SummaryResponse>> {
    let (board, source) = state.load_board(params.data.as_deref());

    let month = params.month()?.or_else(|| board.latest_month());
    let summary = month.map(|m| board.summary(m));

    Ok(Json(SummaryResponse {
        source: source.label().to_string(),
        months: board.months().iter().map(|m| m.to_string()).collect(),
        summary,
    }))
}

/// GET /api/v1/compare
pub async fn compare(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatasetParams>,
) -> ApiResult<Json<CompareResponse>> {
    let (board, source) = state.load_board(params.data.as_deref());

    let ids = params.id_list();
    let records: Vec<_> = board.comparison(&ids).into_iter().cloned().collect();
    let missing = ids
        .into_iter()
        .filter(|id| board.get(id).is_none())
        .collect();

    Ok(Json(CompareResponse {
        source: source.label().to_string(),
        records,
        missing,
    }))
}

/// GET /api/v1/categories
pub async fn list_categories() -> Json<Vec<CategoryResponse>> {
    Json(
        RiskCategory::ALL
            .iter()
            .map(|&key| CategoryResponse {
                key,
                label: key.label(),
                description: key.description(),
            })
            .collect(),
    )
}

//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::board::{DataSource, Month, MonthSummary, RiskCategory, TriageBoard, TriageRecord};
use crate::config::ShareConfig;
use crate::share::ShareFormat;

use super::error::{ApiError, ApiResult};

// ============================================
// DATASET DTOs
// ============================================

/// Query parameters shared by every dataset endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DatasetParams {
    /// Share token (or a full share link); absent means the sample dataset
    #[serde(default)]
    pub data: Option<String>,
    /// Month filter as `YYYY-MM`
    #[serde(default)]
    pub month: Option<String>,
    /// Comma-separated record ids for comparison
    #[serde(default)]
    pub ids: Option<String>,
}

impl DatasetParams {
    /// Parsed month filter; an empty value counts as absent
    pub fn month(&self) -> ApiResult<Option<Month>> {
        match self.month.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(ApiError::Validation),
        }
    }

    pub fn id_list(&self) -> Vec<String> {
        self.ids
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Records plus the token and link that reproduce them
#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    /// "shared" or "sample"
    pub source: String,
    /// Format the incoming token was decoded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ShareFormat>,
    /// Token for the current dataset, always in the current format
    pub token: String,
    pub share_url: String,
    pub records: Vec<TriageRecord>,
}

impl DatasetResponse {
    /// Describe `board`, re-encoding it for the next link
    pub fn build(board: &TriageBoard, source: DataSource, share: &ShareConfig) -> ApiResult<Self> {
        Self::with_records(board, source, share, board.records().to_vec())
    }

    /// Same as [`DatasetResponse::build`] but listing `records` instead of the whole board
    pub fn with_records(
        board: &TriageBoard,
        source: DataSource,
        share: &ShareConfig,
        records: Vec<TriageRecord>,
    ) -> ApiResult<Self> {
        let token = board.to_token()?;
        let share_url = share.link_for(&token);

        Ok(Self {
            source: source.label().to_string(),
            format: source.format(),
            token,
            share_url,
            records,
        })
    }
}

/// Response after creating or deleting a record
#[derive(Debug, Serialize)]
pub struct RecordChangeResponse {
    pub record: TriageRecord,
    pub dataset: DatasetResponse,
}

// ============================================
// SUMMARY DTOs
// ============================================

/// Month list plus the selected month's summary
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub source: String,
    /// Months with records, oldest first
    pub months: Vec<String>,
    /// `None` when the dataset is empty and no month was requested
    pub summary: Option<MonthSummary>,
}

/// Records selected for side-by-side comparison
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub source: String,
    /// Ids that matched a record, ascending by day
    pub records: Vec<TriageRecord>,
    /// Requested ids with no matching record
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// One risk category as shown in the dashboard legend
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub key: RiskCategory,
    pub label: &'static str,
    pub description: &'static str,
}

// ============================================
// SHARE DTOs
// ============================================

/// Encode request
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub records: Vec<TriageRecord>,
}

/// Encode response
#[derive(Debug, Serialize)]
pub struct EncodeResponse {
    pub token: String,
    pub share_url: String,
    /// Character count of the share URL
    pub link_length: usize,
}

/// Decode request; `token` may be a bare token or a whole link
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub token: String,
}

/// Decode response
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub format: ShareFormat,
    /// Whether the token used a decode-only format
    pub legacy: bool,
    pub records: Vec<TriageRecord>,
}

// ============================================
// EXTRACT DTOs
// ============================================

/// Extraction request carrying the raw model reply
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    /// Add the extracted record to the dataset in `data`
    #[serde(default)]
    pub append: bool,
}

/// Extraction response
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    /// Extracted day (`dia`) and counts
    pub extracted: crate::board::NewRecord,
    /// Created record when `append` was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TriageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetResponse>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// Whether the codec round-trips the sample dataset
    pub codec: String,
    pub uptime_seconds: u64,
    pub version: String,
}

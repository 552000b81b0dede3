//! # Triage Board
//!
//! Hospital triage dashboard backend. Daily patient counts per risk
//! category are kept in no database: the whole dataset is compressed into
//! the dashboard link, so sharing the link shares the data.
//!
//! ## Features
//!
//! - **Share codec**: LZ-string URI-safe tokens, plus decode-only support for
//!   the two older base64 link formats
//! - **Dashboard statistics**: monthly totals, peak and low days, per-category shares
//! - **Export**: CSV spreadsheet with Brazilian date formatting
//! - **Extraction**: turns an image-analysis model reply into a record
//!
//! ## Modules
//!
//! - [`share`]: Token encoding, multi-format decoding and link handling
//! - [`board`]: Record types and the record collection
//! - [`export`]: Spreadsheet export
//! - [`extract`]: AI reply parsing
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::{NaiveDate, Utc};
//! use triage_board::board::{CategoryCounts, NewRecord, TriageBoard};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // No token: start from the sample dataset
//!     let (mut board, _source) = TriageBoard::from_token(None);
//!
//!     let day = NaiveDate::from_ymd_opt(2023, 10, 6).ok_or("bad date")?;
//!     board.add(NewRecord::new(day, CategoryCounts::new(1, 4, 10, 25, 6)), Utc::now());
//!
//!     let token = board.to_token()?;
//!     println!("https://painel.example/?data={}", token);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod board;
pub mod config;
pub mod export;
pub mod extract;
pub mod share;

// Re-export top-level types for convenience
pub use board::{
    BoardError, BoardResult, CategoryCounts, DataSource, Month, MonthSummary, NewRecord,
    RiskCategory, TriageBoard, TriageRecord,
};

pub use share::{decode, encode, CodecError, DecodeFailure, Decoded, ShareFormat};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, ShareConfig};

pub use export::ExportError;
pub use extract::{parse_ai_response, ExtractError};

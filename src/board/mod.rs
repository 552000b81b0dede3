//! Triage board
//!
//! Daily patient counts per risk category and the collection that holds them.
//!
//! ## Invariant
//!
//! Every record's `total` equals the sum of its five category counts. The
//! total is derived on creation and checked when records are decoded.

pub mod collection;
pub mod error;
pub mod types;

pub use collection::{CategoryShare, DataSource, DayBreakdown, MonthSummary, TriageBoard};
pub use error::{BoardError, BoardResult};
pub use types::{sample_records, CategoryCounts, Month, NewRecord, RiskCategory, TriageRecord};

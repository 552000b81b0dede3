//! Triage record collection
//!
//! `TriageBoard` is the state container for one dashboard session. It is
//! rebuilt from the share token on every load and serialized back into a
//! token after every change; nothing is kept between sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use super::error::{BoardError, BoardResult};
use super::types::{sample_records, CategoryCounts, Month, NewRecord, RiskCategory, TriageRecord};
use crate::share::{self, ShareFormat};

/// Where the board's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Decoded from a share token in the given format
    Shared(ShareFormat),
    /// Built-in sample dataset
    Sample,
}

impl DataSource {
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Shared(_) => "shared",
            DataSource::Sample => "sample",
        }
    }

    pub fn format(&self) -> Option<ShareFormat> {
        match self {
            DataSource::Shared(format) => Some(*format),
            DataSource::Sample => None,
        }
    }
}

/// Ordered list of triage records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageBoard {
    records: Vec<TriageRecord>,
}

/// Per-category share of one day's total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: RiskCategory,
    pub label: &'static str,
    pub count: u32,
    /// Percentage of the day's total, one decimal place
    pub percent: f64,
}

/// Breakdown of the most recent day in a month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub record: TriageRecord,
    pub shares: Vec<CategoryShare>,
}

/// Aggregates for one month of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    pub label: String,
    /// Number of records in the month
    pub days: usize,
    pub totals: CategoryCounts,
    pub total: u64,
    /// Highest total, earliest day on ties
    pub peak: Option<TriageRecord>,
    /// Lowest total, latest day on ties
    pub low: Option<TriageRecord>,
    pub last_day: Option<DayBreakdown>,
}

fn percent_of(value: u32, total: u64) -> f64 {
    let denominator = total.max(1) as f64;
    (f64::from(value) / denominator * 1000.0).round() / 10.0
}

impl DayBreakdown {
    pub fn of(record: &TriageRecord) -> Self {
        let shares = RiskCategory::ALL
            .iter()
            .map(|&category| {
                let count = record.counts.get(category);
                CategoryShare {
                    category,
                    label: category.label(),
                    count,
                    percent: percent_of(count, record.total),
                }
            })
            .collect();

        Self {
            record: record.clone(),
            shares,
        }
    }
}

impl TriageBoard {
    /// Wrap records in the order given
    pub fn new(records: Vec<TriageRecord>) -> Self {
        Self { records }
    }

    /// Board holding the built-in sample dataset
    pub fn sample() -> Self {
        Self::new(sample_records())
    }

    /// Load from an optional share token
    ///
    /// A missing or empty token, or one that no format can decode, yields the
    /// sample dataset. Decode failures are logged, never returned.
    pub fn from_token(token: Option<&str>) -> (Self, DataSource) {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            tracing::debug!("No shared data, using sample dataset");
            return (Self::sample(), DataSource::Sample);
        };

        match share::decode(token) {
            Ok(decoded) => {
                tracing::debug!(
                    records = decoded.records.len(),
                    format = %decoded.format,
                    "Loaded shared data"
                );
                (Self::new(decoded.records), DataSource::Shared(decoded.format))
            }
            Err(failure) => {
                tracing::warn!(
                    token_len = token.len(),
                    error = %failure,
                    "Could not decode shared data, falling back to sample dataset"
                );
                (Self::sample(), DataSource::Sample)
            }
        }
    }

    pub fn records(&self) -> &[TriageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TriageRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Millisecond timestamp id, bumped until no record uses it
    fn next_id(&self, now: DateTime<Utc>) -> String {
        let mut candidate = now.timestamp_millis();
        loop {
            let id = candidate.to_string();
            if self.get(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }

    /// Create a record from user input
    ///
    /// Assigns a fresh id, derives the total, and keeps the collection sorted
    /// by day (stable, so same-day records stay in insertion order).
    pub fn add(&mut self, input: NewRecord, now: DateTime<Utc>) -> TriageRecord {
        let record = TriageRecord::new(self.next_id(now), input.day, input.counts);
        self.records.push(record.clone());
        self.records.sort_by_key(|r| r.day);

        tracing::info!(id = %record.id, day = %record.day, total = record.total, "Record added");
        record
    }

    /// Remove the record with `id`
    pub fn delete(&mut self, id: &str) -> BoardResult<TriageRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BoardError::RecordNotFound(id.to_string()))?;

        let removed = self.records.remove(idx);
        tracing::info!(id = %removed.id, day = %removed.day, "Record deleted");
        Ok(removed)
    }

    /// Check every record's total against its counts
    pub fn validate(&self) -> BoardResult<()> {
        match self.records.iter().find(|r| !r.is_consistent()) {
            Some(bad) => Err(BoardError::InvalidRecord {
                id: bad.id.clone(),
                reason: format!(
                    "total {} does not match category sum {}",
                    bad.total,
                    bad.counts.sum()
                ),
            }),
            None => Ok(()),
        }
    }

    /// Encode the collection as a share token
    pub fn to_token(&self) -> BoardResult<String> {
        Ok(share::encode(&self.records)?)
    }

    /// Months that have records, oldest first
    pub fn months(&self) -> Vec<Month> {
        self.records
            .iter()
            .map(TriageRecord::month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn latest_month(&self) -> Option<Month> {
        self.records.iter().map(TriageRecord::month).max()
    }

    /// Records of `month`, ascending by day
    pub fn for_month(&self, month: Month) -> Vec<&TriageRecord> {
        let mut selected: Vec<&TriageRecord> = self
            .records
            .iter()
            .filter(|r| month.contains(r.day))
            .collect();
        selected.sort_by_key(|r| r.day);
        selected
    }

    /// Records of `month`, newest day first
    pub fn table(&self, month: Month) -> Vec<&TriageRecord> {
        let mut rows = self.for_month(month);
        rows.sort_by(|a, b| b.day.cmp(&a.day));
        rows
    }

    /// Selected records for side-by-side comparison, ascending by day
    pub fn comparison(&self, ids: &[String]) -> Vec<&TriageRecord> {
        let mut selected: Vec<&TriageRecord> = self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .collect();
        selected.sort_by_key(|r| r.day);
        selected
    }

    /// Monthly totals, peak/low days and the last day's breakdown
    pub fn summary(&self, month: Month) -> MonthSummary {
        let records = self.for_month(month);

        let mut totals = CategoryCounts::default();
        let mut total = 0u64;
        for record in &records {
            totals.accumulate(&record.counts);
            total += record.total;
        }

        let mut by_total = records.clone();
        by_total.sort_by(|a, b| b.total.cmp(&a.total));

        MonthSummary {
            month,
            label: month.label_pt_br(),
            days: records.len(),
            totals,
            total,
            peak: by_total.first().map(|r| (*r).clone()),
            low: by_total.last().map(|r| (*r).clone()),
            last_day: records.last().map(|r| DayBreakdown::of(r)),
        }
    }
}

//! Core data types for the triage board
//!
//! Defines the fundamental types:
//! - RiskCategory: the five fixed triage colours
//! - CategoryCounts: patient counts per category
//! - TriageRecord: one day's counts plus their total
//! - NewRecord: user input for creating a record
//! - Month: calendar month used for grouping

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Risk category of the triage protocol, most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "vermelho")]
    Red,
    #[serde(rename = "laranja")]
    Orange,
    #[serde(rename = "amarelo")]
    Yellow,
    #[serde(rename = "verde")]
    Green,
    #[serde(rename = "azul")]
    Blue,
}

impl RiskCategory {
    /// All categories in wire order
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Red,
        RiskCategory::Orange,
        RiskCategory::Yellow,
        RiskCategory::Green,
        RiskCategory::Blue,
    ];

    /// Field name used in the shared JSON
    pub fn key(&self) -> &'static str {
        match self {
            RiskCategory::Red => "vermelho",
            RiskCategory::Orange => "laranja",
            RiskCategory::Yellow => "amarelo",
            RiskCategory::Green => "verde",
            RiskCategory::Blue => "azul",
        }
    }

    /// Display label, also the spreadsheet column header
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Red => "Vermelho",
            RiskCategory::Orange => "Laranja (CRAI)",
            RiskCategory::Yellow => "Amarelo",
            RiskCategory::Green => "Verde",
            RiskCategory::Blue => "Azul",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskCategory::Red => {
                "Vermelha (Emergencial): Risco iminente de morte. O paciente precisa ser atendido imediatamente."
            }
            RiskCategory::Orange => {
                "Laranja (CRAI): Centro de Referência ao Infantojuvenil atende crianças/adolescentes vítimas de violência."
            }
            RiskCategory::Yellow => "Urgente: Risco moderado e não imediato.",
            RiskCategory::Green => {
                "Pouco Urgente: Casos de baixa gravidade e com o paciente estável."
            }
            RiskCategory::Blue => "Não Urgente: Casos que não necessitam de atendimento imediato.",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        RiskCategory::ALL
            .into_iter()
            .find(|c| c.key() == lower)
            .ok_or_else(|| format!("unknown risk category: {}", s))
    }
}

/// Patient counts for the five categories
///
/// Missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCounts {
    #[serde(rename = "vermelho")]
    pub red: u32,
    #[serde(rename = "laranja")]
    pub orange: u32,
    #[serde(rename = "amarelo")]
    pub yellow: u32,
    #[serde(rename = "verde")]
    pub green: u32,
    #[serde(rename = "azul")]
    pub blue: u32,
}

impl CategoryCounts {
    pub fn new(red: u32, orange: u32, yellow: u32, green: u32, blue: u32) -> Self {
        Self {
            red,
            orange,
            yellow,
            green,
            blue,
        }
    }

    pub fn get(&self, category: RiskCategory) -> u32 {
        match category {
            RiskCategory::Red => self.red,
            RiskCategory::Orange => self.orange,
            RiskCategory::Yellow => self.yellow,
            RiskCategory::Green => self.green,
            RiskCategory::Blue => self.blue,
        }
    }

    pub fn set(&mut self, category: RiskCategory, value: u32) {
        match category {
            RiskCategory::Red => self.red = value,
            RiskCategory::Orange => self.orange = value,
            RiskCategory::Yellow => self.yellow = value,
            RiskCategory::Green => self.green = value,
            RiskCategory::Blue => self.blue = value,
        }
    }

    /// Sum of all five categories
    pub fn sum(&self) -> u64 {
        RiskCategory::ALL
            .iter()
            .map(|&c| u64::from(self.get(c)))
            .sum()
    }

    /// Add another set of counts, saturating per category
    pub fn accumulate(&mut self, other: &CategoryCounts) {
        for category in RiskCategory::ALL {
            let value = self.get(category).saturating_add(other.get(category));
            self.set(category, value);
        }
    }
}

/// One day of triage counts
///
/// Serializes with keys in the order `id, dia, vermelho, laranja, amarelo,
/// verde, azul, total`, the layout shared links have always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageRecord {
    /// Unique identifier, derived from the creation timestamp
    pub id: String,
    /// Calendar day the counts belong to
    #[serde(rename = "dia")]
    pub day: NaiveDate,
    #[serde(flatten)]
    pub counts: CategoryCounts,
    /// Always the sum of `counts`
    pub total: u64,
}

impl TriageRecord {
    /// Create a record; the total is derived from the counts
    pub fn new(id: impl Into<String>, day: NaiveDate, counts: CategoryCounts) -> Self {
        Self {
            id: id.into(),
            day,
            counts,
            total: counts.sum(),
        }
    }

    /// Whether `total` equals the category sum
    pub fn is_consistent(&self) -> bool {
        self.total == self.counts.sum()
    }

    pub fn month(&self) -> Month {
        Month::of(self.day)
    }
}

/// Input for a new record: the day and its counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "dia")]
    pub day: NaiveDate,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

impl NewRecord {
    pub fn new(day: NaiveDate, counts: CategoryCounts) -> Self {
        Self { day, counts }
    }
}

const MONTH_NAMES_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `day`
    pub fn of(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        Month::of(day) == *self
    }

    /// Long Brazilian Portuguese label, e.g. "outubro de 2023"
    pub fn label_pt_br(&self) -> String {
        let name = MONTH_NAMES_PT_BR
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} de {}", name, self.year)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {:?}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in {:?}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {:?}", s))?;
        Month::new(year, month).ok_or_else(|| format!("month out of range in {:?}", s))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Built-in dataset used when no shared data is available
pub fn sample_records() -> Vec<TriageRecord> {
    let rows: [(&str, u32, CategoryCounts); 5] = [
        ("1", 1, CategoryCounts::new(2, 5, 15, 30, 10)),
        ("2", 2, CategoryCounts::new(1, 8, 12, 35, 8)),
        ("3", 3, CategoryCounts::new(3, 4, 18, 25, 12)),
        ("4", 4, CategoryCounts::new(0, 6, 20, 40, 15)),
        ("5", 5, CategoryCounts::new(2, 7, 16, 28, 9)),
    ];

    rows.into_iter()
        .filter_map(|(id, day, counts)| {
            NaiveDate::from_ymd_opt(2023, 10, day).map(|day| TriageRecord::new(id, day, counts))
        })
        .collect()
}

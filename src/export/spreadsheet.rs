//! CSV spreadsheet export
//!
//! One row per record in collection order:
//! `Data, Vermelho, Laranja (CRAI), Amarelo, Verde, Azul, Total`

use std::io;
use thiserror::Error;

use super::format_br_date;
use crate::board::{RiskCategory, TriageRecord};

/// Default download name for the spreadsheet
pub const SPREADSHEET_FILENAME: &str = "relatorio_triagem.csv";

/// Errors that can occur while exporting
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn header() -> Vec<&'static str> {
    let mut columns = vec!["Data"];
    columns.extend(RiskCategory::ALL.iter().map(|c| c.label()));
    columns.push("Total");
    columns
}

/// Write the collection as CSV
pub fn write_csv<W: io::Write>(records: &[TriageRecord], writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header())?;

    for record in records {
        let mut row = vec![format_br_date(record.day)];
        row.extend(
            RiskCategory::ALL
                .iter()
                .map(|&c| record.counts.get(c).to_string()),
        );
        row.push(record.total.to_string());
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}

/// Render the collection as a CSV string
pub fn to_csv_string(records: &[TriageRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

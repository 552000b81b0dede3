//! Data export
//!
//! Spreadsheet export of the record collection plus the Brazilian date
//! formatting the dashboard shows.

mod spreadsheet;

pub use spreadsheet::{to_csv_string, write_csv, ExportError, SPREADSHEET_FILENAME};

use chrono::NaiveDate;

/// Format a day as `dd/mm/yyyy`
pub fn format_br_date(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_br_date() {
        let day = NaiveDate::from_ymd_opt(2023, 10, 5).unwrap();
        assert_eq!(format_br_date(day), "05/10/2023");
    }
}

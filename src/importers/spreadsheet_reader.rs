use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::Reading;

/// Ten metadata rows followed by the column header row
pub const DEFAULT_HEADER_ROWS: usize = 11;

/// Largest Excel serial calamine can represent (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Failed to read worksheet: {0}")]
    Worksheet(String),
}

/// Reads the monthly (date, value) series from a station spreadsheet.
///
/// # Expected Sheet Structure:
/// ```text
/// Rows 1-10: Station metadata (name, code, coordinates, ...)
/// Row 11:    Column headers ("Fecha" | "Valor")
/// Row 12+:   Monthly data (date | numeric value)
/// ```
///
/// Only the first worksheet is read. Rows without a usable date or value are
/// skipped without error, and zero or non-finite values are dropped.
#[derive(Debug, Clone)]
pub struct SpreadsheetReader {
    header_rows: usize,
}

impl Default for SpreadsheetReader {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_ROWS)
    }
}

impl SpreadsheetReader {
    pub fn new(header_rows: usize) -> Self {
        Self { header_rows }
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    /// Parse a workbook held in memory (xlsx, xlsm, xls or ods)
    pub fn read_bytes(&self, bytes: Vec<u8>) -> Result<Vec<Reading>, ReadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ReadError::WorkbookOpen(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ReadError::NoWorksheet)?
            .map_err(|e| ReadError::Worksheet(e.to_string()))?;

        Ok(self.read_range(&range))
    }

    /// Extract readings from an already loaded worksheet range
    pub fn read_range(&self, range: &Range<Data>) -> Vec<Reading> {
        let Some((last_row, _)) = range.end() else {
            debug!("Worksheet is empty");
            return Vec::new();
        };

        let mut readings = Vec::new();
        let mut skipped = 0usize;

        // Positions are absolute so the header offset does not depend on
        // where the used range starts
        let first_row = u32::try_from(self.header_rows).unwrap_or(u32::MAX);
        for row in first_row..=last_row {
            let date = range.get_value((row, 0)).and_then(parse_date);
            let value = range.get_value((row, 1)).and_then(parse_value);

            match (date, value) {
                (Some(date), Some(value)) if value != 0.0 && value.is_finite() => {
                    readings.push(Reading::new(date, value));
                }
                _ => {
                    debug!("Skipping row {}: no usable date/value pair", row + 1);
                    skipped += 1;
                }
            }
        }

        info!(
            "Parsed {} readings ({} rows skipped after {} header rows)",
            readings.len(),
            skipped,
            self.header_rows
        );
        readings
    }
}

/// Interpret a cell as a calendar day
fn parse_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(excel_date) => excel_date.as_datetime().map(|dt| dt.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_str(s),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        // Month-only labels such as "2023-04"
        .or_else(|| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok())
}

/// Excel date serial (days since 1899-12-30) to a date
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let base_date = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base_date.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Interpret a cell as a measurement value
fn parse_value(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

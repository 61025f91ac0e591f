// Tests for SpreadsheetReader against the bundled sample workbook and
// hand-built worksheet ranges

use antisana_forecast_service::importers::{ReadError, SpreadsheetReader};
use antisana_forecast_service::models::Reading;
use calamine::{Data, Range};
use chrono::NaiveDate;

const SAMPLE_WORKBOOK: &str = "sample-data-files/antisana_monthly_sample.xlsx";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_bytes() -> Vec<u8> {
    std::fs::read(SAMPLE_WORKBOOK).expect("sample workbook should exist")
}

/// A worksheet with `header_rows` metadata rows, then the given data rows
fn sheet(header_rows: u32, rows: &[(Data, Data)]) -> Range<Data> {
    let last_row = header_rows + rows.len().max(1) as u32 - 1;
    let mut range = Range::new((0, 0), (last_row, 1));
    for row in 0..header_rows.saturating_sub(1) {
        range.set_value((row, 0), Data::String(format!("metadata {}", row + 1)));
    }
    if header_rows > 0 {
        range.set_value((header_rows - 1, 0), Data::String("Fecha".to_string()));
        range.set_value((header_rows - 1, 1), Data::String("Valor".to_string()));
    }
    for (i, (date_cell, value_cell)) in rows.iter().enumerate() {
        let row = header_rows + i as u32;
        range.set_value((row, 0), date_cell.clone());
        range.set_value((row, 1), value_cell.clone());
    }
    range
}

#[test]
fn test_sample_workbook_readings() {
    let reader = SpreadsheetReader::default();
    let readings = reader.read_bytes(sample_bytes()).unwrap();

    assert_eq!(
        readings,
        vec![
            Reading::new(date(2023, 1, 1), 10.0),
            Reading::new(date(2023, 2, 1), 12.0),
            Reading::new(date(2023, 3, 1), 11.5),
            Reading::new(date(2024, 1, 1), 14.0),
            Reading::new(date(2024, 2, 1), 16.0),
        ]
    );
}

#[test]
fn test_sample_workbook_drops_unusable_rows() {
    let readings = SpreadsheetReader::default().read_bytes(sample_bytes()).unwrap();

    // zero, blank and "s/d" values plus the undated row are all skipped
    assert!(readings.iter().all(|r| r.value != 0.0));
    assert!(!readings.iter().any(|r| r.date == date(2023, 4, 1)));
    assert!(!readings.iter().any(|r| r.date == date(2023, 5, 1)));
    assert!(!readings.iter().any(|r| r.date == date(2023, 6, 1)));
}

#[test]
fn test_sample_workbook_with_too_many_header_rows() {
    // Skipping past every data row leaves nothing
    let readings = SpreadsheetReader::new(40).read_bytes(sample_bytes()).unwrap();
    assert!(readings.is_empty());
}

#[test]
fn test_read_bytes_garbage() {
    let result = SpreadsheetReader::default().read_bytes(b"PK\x03\x04 truncated".to_vec());
    match result {
        Err(ReadError::WorkbookOpen(_)) | Err(ReadError::Worksheet(_)) => {}
        other => panic!("Expected a workbook error, got {:?}", other),
    }
}

#[test]
fn test_read_range_mixed_cells() {
    let range = sheet(
        11,
        &[
            (Data::Float(44927.0), Data::Float(10.0)),
            (Data::String("2023-02".to_string()), Data::Int(5)),
            (
                Data::DateTimeIso("2023-03-15T00:00:00".to_string()),
                Data::String(" 7.25 ".to_string()),
            ),
            (Data::Int(45017), Data::Float(-2.5)),
        ],
    );

    let readings = SpreadsheetReader::default().read_range(&range);

    assert_eq!(
        readings,
        vec![
            Reading::new(date(2023, 1, 1), 10.0),
            Reading::new(date(2023, 2, 1), 5.0),
            Reading::new(date(2023, 3, 15), 7.25),
            // negative values are kept, only zero is treated as missing
            Reading::new(date(2023, 4, 1), -2.5),
        ]
    );
}

#[test]
fn test_read_range_skips_incomplete_rows() {
    let range = sheet(
        11,
        &[
            (Data::Empty, Data::Float(3.0)),
            (Data::Float(44927.0), Data::Empty),
            (Data::Float(44958.0), Data::Float(0.0)),
            (Data::Float(44986.0), Data::Float(f64::NAN)),
            (Data::String("sin fecha".to_string()), Data::Float(4.0)),
            (Data::Bool(true), Data::Float(4.0)),
            (Data::Float(45017.0), Data::Float(8.0)),
        ],
    );

    let readings = SpreadsheetReader::default().read_range(&range);
    assert_eq!(readings, vec![Reading::new(date(2023, 4, 1), 8.0)]);
}

#[test]
fn test_read_range_keeps_source_order() {
    let range = sheet(
        11,
        &[
            (Data::Float(45292.0), Data::Float(2.0)),
            (Data::Float(44927.0), Data::Float(1.0)),
        ],
    );

    let readings = SpreadsheetReader::default().read_range(&range);
    assert_eq!(readings[0].date, date(2024, 1, 1));
    assert_eq!(readings[1].date, date(2023, 1, 1));
}

#[test]
fn test_read_range_custom_header_rows() {
    let range = sheet(1, &[(Data::Float(44927.0), Data::Float(6.0))]);

    let readings = SpreadsheetReader::new(1).read_range(&range);
    assert_eq!(readings, vec![Reading::new(date(2023, 1, 1), 6.0)]);

    // With the default offset the single data row is treated as metadata
    assert!(SpreadsheetReader::default().read_range(&range).is_empty());
}

#[test]
fn test_read_range_header_only() {
    let mut range: Range<Data> = Range::new((0, 0), (10, 1));
    range.set_value((10, 0), Data::String("Fecha".to_string()));
    range.set_value((10, 1), Data::String("Valor".to_string()));

    assert!(SpreadsheetReader::default().read_range(&range).is_empty());
}

#[test]
fn test_read_range_empty_sheet() {
    let range: Range<Data> = Range::empty();
    assert!(SpreadsheetReader::default().read_range(&range).is_empty());
}

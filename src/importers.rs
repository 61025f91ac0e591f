// ! Station spreadsheet ingestion: workbook parsing and per-station loading

pub mod spreadsheet_reader;
pub mod station_loader;

// Re-export commonly used items
pub use spreadsheet_reader::{ReadError, SpreadsheetReader, DEFAULT_HEADER_ROWS};
pub use station_loader::{LoadError, StationLoader};

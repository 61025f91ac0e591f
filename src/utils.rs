//! Shared formatting helpers for chart labels

use chrono::NaiveDate;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter English month name for `month` in 1..=12
///
/// # Examples
///
/// ```
/// use antisana_forecast_service::utils::month_abbreviation;
///
/// assert_eq!(month_abbreviation(1), Some("Jan"));
/// assert_eq!(month_abbreviation(12), Some("Dec"));
/// assert_eq!(month_abbreviation(13), None);
/// ```
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    MONTH_ABBREVIATIONS.get(month.checked_sub(1)? as usize).copied()
}

/// Chart label for a point in time, e.g. "Jan 2024"
pub fn month_year_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

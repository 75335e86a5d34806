//! Cell-level coercion helpers shared by the normalizer.
//!
//! The export is day-first UK format. Date columns are parsed under an
//! ordered list of strict formats first; when a column defeats every strict
//! format the caller falls back to [`parse_date_lenient`], which turns
//! unparseable cells into `None` instead of failing the column.

use chrono::{NaiveDate, NaiveDateTime};

/// Strict formats tried in order against every non-empty cell of a date
/// column. Both carry the day-first convention of the source system.
pub const STRICT_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d/%m/%Y %H:%M:%S"];

const LENIENT_DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d/%m/%y",
    "%Y-%m-%d",
];

const LENIENT_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a cell under a single strict format. A time component is truncated
/// to its calendar date.
pub fn parse_date_strict(value: &str, format: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if format.contains("%H") {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|dt| dt.date())
    } else {
        NaiveDate::parse_from_str(trimmed, format).ok()
    }
}

/// Best-effort day-first parse used once strict parsing has been ruled out
/// for a column. Returns `None` for anything unrecognisable.
pub fn parse_date_lenient(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in LENIENT_DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in LENIENT_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// Coerce a cell to a float. Unparseable or blank cells become `None`,
/// never zero.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Round to one decimal place, the precision the dashboard shows margins at.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//! Event date parsing and load-file formatting.

use chrono::{NaiveDate, NaiveDateTime};
use ges_model::text::is_blank_marker;

/// Format written to the load files.
pub const OUTPUT_DATE_FORMAT: &str = "%d-%m-%Y";

const DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"];
const TIME_SUFFIXES: [&str; 2] = [" %H:%M:%S", " %H:%M"];

/// An event date as parsed and as it will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    pub date: Option<NaiveDate>,
    pub text: String,
}

impl EventDate {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Parse a date cell in any of the accepted formats, with or without a time.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
        for suffix in TIME_SUFFIXES {
            let with_time = format!("{format}{suffix}");
            if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, &with_time) {
                return Some(datetime.date());
            }
        }
    }
    None
}

/// Normalize a date cell for output.
///
/// Parseable dates are rewritten as `dd-mm-yyyy`. Other non-blank text is
/// kept for the side tables but has no `date`, which keeps the row out of
/// the load files. Blank markers become an empty text.
pub fn format_event_date(raw: &str) -> EventDate {
    if is_blank_marker(raw) {
        return EventDate {
            date: None,
            text: String::new(),
        };
    }
    match parse_event_date(raw) {
        Some(date) => EventDate {
            date: Some(date),
            text: date.format(OUTPUT_DATE_FORMAT).to_string(),
        },
        None => EventDate {
            date: None,
            text: raw.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn accepts_each_format() {
        assert_eq!(parse_event_date("15-01-2025"), Some(ymd(2025, 1, 15)));
        assert_eq!(parse_event_date("2025-01-15"), Some(ymd(2025, 1, 15)));
        assert_eq!(parse_event_date("15/01/2025"), Some(ymd(2025, 1, 15)));
        assert_eq!(
            parse_event_date("2025-01-15 08:30:00"),
            Some(ymd(2025, 1, 15))
        );
        assert_eq!(parse_event_date("15/01/2025 08:30"), Some(ymd(2025, 1, 15)));
        assert_eq!(parse_event_date("enero 2025"), None);
    }

    #[test]
    fn formats_for_output() {
        assert_eq!(format_event_date("2025-03-04").text, "04-03-2025");
        let raw = format_event_date("sin fecha");
        assert_eq!(raw.text, "sin fecha");
        assert!(raw.date.is_none());
        assert!(format_event_date("nan").is_blank());
        assert!(format_event_date("  ").is_blank());
    }
}

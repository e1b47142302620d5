//! Recognized date layouts.
//!
//! Each layout pairs a regex for the exact textual shape with a chrono format
//! string. The regex keeps chrono's lenient numeric parsing from accepting
//! shapes outside the layout (e.g. one-digit months for `MM/DD/YYYY`).

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// A single accepted date layout.
#[derive(Debug)]
pub struct DateFormat {
    /// Human-readable layout, e.g. `YYYY-MM-DD`.
    pub layout: &'static str,
    shape: Regex,
    chrono_format: &'static str,
}

impl DateFormat {
    fn new(layout: &'static str, shape: &str, chrono_format: &'static str) -> Self {
        Self {
            layout,
            shape: Regex::new(shape).expect("valid date shape regex"),
            chrono_format,
        }
    }

    /// Parse `value` with this layout.
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        if !self.shape.is_match(value) {
            return None;
        }
        NaiveDate::parse_from_str(value, self.chrono_format).ok()
    }
}

/// Date layouts in priority order; the first match wins.
pub static DATE_FORMATS: Lazy<Vec<DateFormat>> = Lazy::new(|| {
    vec![
        DateFormat::new("YYYY-MM-DD", r"^\d{4}-\d{2}-\d{2}$", "%Y-%m-%d"),
        DateFormat::new("MM/DD/YYYY", r"^\d{2}/\d{2}/\d{4}$", "%m/%d/%Y"),
        DateFormat::new("M/D/YYYY", r"^\d{1,2}/\d{1,2}/\d{4}$", "%m/%d/%Y"),
        DateFormat::new("YYYY/MM/DD", r"^\d{4}/\d{2}/\d{2}$", "%Y/%m/%d"),
        DateFormat::new("YYYY-M-D", r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
        DateFormat::new("MM-DD-YYYY", r"^\d{2}-\d{2}-\d{4}$", "%m-%d-%Y"),
        DateFormat::new("D Mon YYYY", r"^\d{1,2} [A-Za-z]{3} \d{4}$", "%d %b %Y"),
        DateFormat::new(
            "Month D, YYYY",
            r"(?i)^(january|february|march|april|may|june|july|august|september|october|november|december) \d{1,2}, \d{4}$",
            "%B %d, %Y",
        ),
    ]
});

/// Parse a date using the first matching layout in [`DATE_FORMATS`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS.iter().find_map(|format| format.parse(value))
}

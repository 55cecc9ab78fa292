//! Calendar-date handling for `date` fields.
//!
//! Dates are compared as calendar dates in UTC. Both the stored value and
//! "today" are reduced to a `NaiveDate` before any comparison, so the time
//! of day and the machine's local offset never change a validation outcome.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use std::fmt::Write as _;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Relative token: the current calendar date.
pub const TODAY: &str = "today";
/// Relative token: any date after today.
pub const FUTURE: &str = "future";

/// Encodings tried, in order, when repairing a date that does not parse in
/// its configured format. RFC 3339 (with or without fractional seconds) is
/// tried last.
const ALTERNATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S",
];

/// Current calendar date in the reference timezone.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn effective_format(format: Option<&str>) -> &str {
    match format {
        Some(f) if !f.trim().is_empty() => f,
        _ => DEFAULT_DATE_FORMAT,
    }
}

/// Format `date` with a strftime pattern. The pattern must already have
/// passed [`check_format`].
pub fn format_date(date: NaiveDate, format: &str) -> String {
    try_format(date, format).unwrap_or_else(|| date.format(DEFAULT_DATE_FORMAT).to_string())
}

fn try_format(date: NaiveDate, format: &str) -> Option<String> {
    let instant = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
    let mut out = String::new();
    write!(out, "{}", instant.format(format)).ok()?;
    Some(out)
}

/// Parse `value` strictly: it must parse in `format` and re-format to the
/// exact same text.
pub fn parse_date(value: &str, format: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, format).ok()?;
    (try_format(date, format)? == value).then_some(date)
}

/// Strict `YYYY-MM-DD`, used for the hardcoded `created` field.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    parse_date(value, DEFAULT_DATE_FORMAT)
}

/// Try every known alternate encoding, returning the first date that parses.
pub fn parse_alternate(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ALTERNATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Reject a date pattern that cannot be trusted: unknown specifiers, output
/// that does not distinguish two different dates, or output that does not
/// parse back to the date it was formatted from.
pub fn check_format(format: &str) -> Result<(), String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date format '{format}'"));
    }
    let first = NaiveDate::from_ymd_opt(2006, 1, 2).ok_or("bad reference date")?;
    let second = NaiveDate::from_ymd_opt(2017, 11, 23).ok_or("bad reference date")?;
    let (Some(a), Some(b)) = (try_format(first, format), try_format(second, format)) else {
        return Err(format!("date format '{format}' cannot format a calendar date"));
    };
    if a == b {
        return Err(format!(
            "date format '{format}' does not distinguish different dates"
        ));
    }
    for (date, text) in [(first, &a), (second, &b)] {
        if NaiveDate::parse_from_str(text, format).ok() != Some(date) {
            return Err(format!("date format '{format}' does not round-trip"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DateBound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Today,
    Future,
    Absolute(NaiveDate),
}

impl DateBound {
    /// Parse a bound: one of the relative tokens or an absolute date in the
    /// field's format (or `YYYY-MM-DD`).
    pub fn parse(raw: &str, format: &str) -> Result<DateBound, String> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            TODAY => return Ok(DateBound::Today),
            FUTURE => return Ok(DateBound::Future),
            _ => {}
        }
        parse_date(raw, format)
            .or_else(|| parse_iso_date(raw))
            .map(DateBound::Absolute)
            .ok_or_else(|| format!("invalid date bound '{raw}'"))
    }

    /// Earliest allowed date when used as a lower bound. `future` excludes today.
    pub fn lower(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateBound::Today => Some(today),
            DateBound::Future => today.checked_add_days(Days::new(1)),
            DateBound::Absolute(d) => Some(d),
        }
    }

    /// Latest allowed date when used as an upper bound. `future` is unbounded.
    pub fn upper(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateBound::Today => Some(today),
            DateBound::Future => None,
            DateBound::Absolute(d) => Some(d),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn strict_parse_requires_round_trip() {
        assert_eq!(parse_date("2024-03-05", "%Y-%m-%d"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("2024-3-5", "%Y-%m-%d"), None);
        assert_eq!(parse_date("05/03/2024", "%d/%m/%Y"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("not a date", "%Y-%m-%d"), None);
    }

    #[test]
    fn alternate_encodings() {
        let want = Some(d(2024, 1, 15));
        for raw in [
            "2024-01-15",
            "2024/01/15",
            "01/15/2024",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00+0200",
            "2024-01-15T10:30:00Z",
            "2024-01-15T10:30:00.123456789Z",
            "2024-01-15T10:30:00-05:00",
        ] {
            assert_eq!(parse_alternate(raw), want, "{raw}");
        }
        assert_eq!(parse_alternate("next tuesday"), None);
    }

    #[test]
    fn format_checks() {
        assert!(check_format("%Y-%m-%d").is_ok());
        assert!(check_format("%d.%m.%Y").is_ok());
        assert!(check_format("release-day").is_err());
        assert!(check_format("%Y").is_err());
        assert!(check_format("%Q").is_err());
    }

    #[test]
    fn bounds() {
        let today = d(2024, 6, 10);
        assert_eq!(DateBound::parse("today", "%Y-%m-%d").unwrap().lower(today), Some(today));
        assert_eq!(
            DateBound::parse("future", "%Y-%m-%d").unwrap().lower(today),
            Some(d(2024, 6, 11))
        );
        assert_eq!(DateBound::Future.upper(today), None);
        assert_eq!(
            DateBound::parse("2024-01-01", "%d/%m/%Y").unwrap(),
            DateBound::Absolute(d(2024, 1, 1))
        );
        assert!(DateBound::parse("soon", "%Y-%m-%d").is_err());
    }

    #[test]
    fn effective_format_defaults() {
        assert_eq!(effective_format(None), DEFAULT_DATE_FORMAT);
        assert_eq!(effective_format(Some("")), DEFAULT_DATE_FORMAT);
        assert_eq!(effective_format(Some("%d/%m/%Y")), "%d/%m/%Y");
    }
}

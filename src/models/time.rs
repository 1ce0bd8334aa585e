//! Date and timestamp formats
//!
//! Timestamps are stored as fixed-width UTC text so that SQLite string
//! comparison orders them chronologically.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use rusqlite::types::Value as SqlValue;
use serde::Serializer;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Current UTC time at microsecond precision
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Round up to the next stored microsecond; exact microseconds are unchanged
pub fn ceil_micros(ts: &NaiveDateTime) -> NaiveDateTime {
    let truncated = ts.trunc_subsecs(6);
    if truncated == *ts {
        return truncated;
    }
    truncated
        .checked_add_signed(Duration::microseconds(1))
        .unwrap_or(truncated)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive `YYYY-MM-DDTHH:MM[:SS[.f]]`
/// taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn timestamp_sql(ts: &NaiveDateTime) -> SqlValue {
    SqlValue::Text(format_timestamp(ts))
}

pub fn date_sql(date: &NaiveDate) -> SqlValue {
    SqlValue::Text(date.format(DATE_FORMAT).to_string())
}

/// serde `serialize_with` for stored timestamps
pub fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_format_is_fixed_width() {
        let whole = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        assert_eq!(format_timestamp(&whole), "2025-03-01T08:05:00.000000");

        let fractional = whole.with_nanosecond(120_000).unwrap();
        assert_eq!(format_timestamp(&fractional), "2025-03-01T08:05:00.000120");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-03-01T08:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T08:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T10:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T08:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_ceil_micros() {
        let whole = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(ceil_micros(&whole), whole);

        let half = whole.with_nanosecond(500).unwrap();
        assert_eq!(format_timestamp(&ceil_micros(&half)), "2025-01-01T00:00:00.000001");

        let exact = whole.with_nanosecond(7_000).unwrap();
        assert_eq!(ceil_micros(&exact), exact);
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        assert_eq!(now().nanosecond() % 1_000, 0);
    }
}

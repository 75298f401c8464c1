//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Parse a frontmatter date string in the formats authors commonly use
///
/// Naive values (no offset) are read as UTC.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Try RFC 3339 / ISO 8601 with offset first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    let offset_formats = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%.f%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Format a timestamp the way it is stored in frontmatter and JSON views
///
/// # Examples
/// ```ignore
/// to_iso(&date) // -> "2024-01-15T10:30:00.000Z"
/// ```
pub fn to_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format a timestamp for RSS `<pubDate>`
pub fn to_rfc2822(date: &DateTime<Utc>) -> String {
    date.to_rfc2822()
}

/// Serde helper writing a timestamp with [`to_iso`]
pub fn serialize_iso<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso(date))
}

/// Serde helper writing an optional timestamp with [`to_iso`]
pub fn serialize_iso_opt<S: Serializer>(
    date: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&to_iso(date)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_common_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_date_string("2024/01/15 10:30"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_date_string("2024-01-15T18:30:00+08:00"), Some(expected));
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_date_string("2024-01-15").unwrap();
        assert_eq!(to_iso(&dt), "2024-01-15T00:00:00.000Z");
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date_string(""), None);
        assert_eq!(parse_date_string("last tuesday"), None);
    }

    #[test]
    fn test_iso_round_trips_through_parser() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(parse_date_string(&to_iso(&dt)), Some(dt));
    }
}

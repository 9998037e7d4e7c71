//! Change detection against the stored `lastFileUpdate` watermark.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::sync::types::SyncRecord;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a watermark as a point in time.
///
/// Accepts RFC 3339 (what Drive returns), RFC 2822, and zone-less date or
/// date-time strings with or without zero padding (`2024-1-2`). Zone-less
/// values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Whether the document last modified at `fetched` must be re-synced over
/// `stored`.
///
/// True when nothing was stored yet, whatever `fetched` holds. Otherwise
/// true only when both values parse and `fetched` is strictly later; an
/// unreadable value on either side never counts as newer.
pub fn needs_update(stored: Option<&SyncRecord>, fetched: &str) -> bool {
    let Some(record) = stored else {
        return true;
    };
    match (parse_timestamp(fetched), parse_timestamp(&record.last_file_update)) {
        (Some(fetched), Some(previous)) => fetched > previous,
        (fetched_at, _) => {
            let unreadable = if fetched_at.is_none() { "fetched" } else { "stored" };
            tracing::warn!(
                fetched = %fetched,
                stored = %record.last_file_update,
                unreadable,
                "unreadable watermark; leaving record as is"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(watermark: &str) -> SyncRecord {
        SyncRecord {
            last_file_update: watermark.into(),
            data: None,
        }
    }

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    fn newer(stored: &str, fetched: &str) -> bool {
        needs_update(Some(&record(stored)), fetched)
    }

    #[test]
    fn parses_drive_modified_time() {
        assert_eq!(
            ts("2024-06-01T10:15:30.123Z"),
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 15, 30).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn parses_offsets_into_utc() {
        assert_eq!(ts("2024-06-01T03:00:00+03:00"), ts("2024-06-01T00:00:00Z"));
    }

    #[test]
    fn parses_unpadded_dates() {
        assert_eq!(ts("2024-1-2"), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn missing_record_always_needs_update() {
        assert!(needs_update(None, "1970-01-01T00:00:00Z"));
        assert!(needs_update(None, "last tuesday"));
        assert!(needs_update(None, ""));
    }

    #[test]
    fn compares_as_dates_not_strings() {
        assert!(newer("2024-01-01", "2024-1-2"));
        assert!(!newer("2024-1-2", "2024-01-01"));

        // Lexicographically "2024-01-10" < "2024-1-2"; as dates it is later.
        assert!("2024-01-10" < "2024-1-2");
        assert!(newer("2024-1-2", "2024-01-10"));
    }

    #[test]
    fn equal_watermark_does_not_update() {
        assert!(!newer("2024-06-01T00:00:00Z", "2024-06-01T00:00:00.000Z"));
    }

    #[test]
    fn later_watermark_updates() {
        assert!(newer("2024-06-01T00:00:00Z", "2024-06-01T00:00:01Z"));
    }

    #[test]
    fn unreadable_values_never_count_as_newer() {
        assert!(!newer("not a date", "2000-01-01"));
        assert!(!newer("2000-01-01", "last tuesday"));
        assert!(!newer("", ""));
    }
}

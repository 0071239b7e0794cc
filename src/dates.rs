use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp formats job APIs actually send. Values without an
/// offset are read as UTC. `None` is the "Invalid Date" case.
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
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD` in UTC, regardless of the local timezone.
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

pub fn display_date(raw: Option<&str>) -> String {
    match raw.and_then(parse_timestamp) {
        Some(instant) => format_date(instant),
        None => "Invalid Date".to_string(),
    }
}

pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    days_before(Utc::now(), days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-03-01T23:30:00-05:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 2, 4, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_and_date_only_as_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01 08:15:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 15, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-03-01T08:15:00.123").unwrap().format("%H:%M:%S").to_string(),
            "08:15:00"
        );
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_rfc2822() {
        let parsed = parse_timestamp("Fri, 01 Mar 2024 12:00:00 +0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_is_invalid() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn test_format_date_is_timezone_invariant() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 0).unwrap();
        let east = FixedOffset::east_opt(9 * 3600).unwrap();
        let west = FixedOffset::west_opt(8 * 3600).unwrap();

        // Same instant seen from different offsets formats identically.
        let from_east = utc.with_timezone(&east).with_timezone(&Utc);
        let from_west = utc.with_timezone(&west).with_timezone(&Utc);
        assert_eq!(format_date(utc), "2024-01-05");
        assert_eq!(format_date(from_east), "2024-01-05");
        assert_eq!(format_date(from_west), "2024-01-05");
    }

    #[test]
    fn test_format_date_zero_pads() {
        let instant = Utc.with_ymd_and_hms(987, 2, 3, 0, 0, 0).unwrap();
        assert_eq!(format_date(instant), "0987-02-03");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date(Some("2024-07-09T01:00:00+03:00")), "2024-07-08");
        assert_eq!(display_date(Some("not a date")), "Invalid Date");
        assert_eq!(display_date(None), "Invalid Date");
    }

    #[test]
    fn test_days_before() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(days_before(now, 1), Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        assert_eq!(days_before(now, 30), Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_days_ago_is_in_the_past() {
        let cutoff = days_ago(7);
        assert!(cutoff < Utc::now());
        assert!(Utc::now() - cutoff >= Duration::days(7));
    }
}

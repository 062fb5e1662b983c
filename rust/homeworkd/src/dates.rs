use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DueDate {
    /// `YYYY-MM-DD`, read as midnight UTC.
    Day(NaiveDate),
    /// Date-time with an explicit offset; the calendar day is the one written.
    Zoned(DateTime<chrono::FixedOffset>),
    /// Date-time without an offset, read as UTC.
    Naive(NaiveDateTime),
}

impl DueDate {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self::Day(d));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::Zoned(dt));
        }
        NAIVE_DATE_TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Self::Naive)
    }

    pub fn calendar_date(&self) -> NaiveDate {
        match self {
            Self::Day(d) => *d,
            Self::Zoned(dt) => dt.date_naive(),
            Self::Naive(dt) => dt.date(),
        }
    }

    pub fn timestamp_millis(&self) -> i64 {
        match self {
            Self::Day(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis())
                .unwrap_or(0),
            Self::Zoned(dt) => dt.timestamp_millis(),
            Self::Naive(dt) => dt.and_utc().timestamp_millis(),
        }
    }
}

/// Sort key for an optional due date. Missing and unreadable dates both land on epoch zero.
pub fn sort_instant(due: Option<&str>) -> i64 {
    due.and_then(DueDate::parse)
        .map(|d| d.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_is_utc_midnight() {
        let d = DueDate::parse("1970-01-02").expect("parse");
        assert_eq!(d.timestamp_millis(), 86_400_000);
    }

    #[test]
    fn offset_date_time_keeps_written_day() {
        let d = DueDate::parse("2024-03-10T23:30:00-05:00").expect("parse");
        assert_eq!(
            d.calendar_date(),
            NaiveDate::from_ymd_opt(2024, 3, 10).expect("date")
        );
        assert_eq!(
            d.timestamp_millis(),
            DueDate::parse("2024-03-11T04:30:00Z")
                .expect("parse")
                .timestamp_millis()
        );
    }

    #[test]
    fn naive_date_time_variants_parse() {
        assert!(matches!(
            DueDate::parse("2024-03-10T08:15"),
            Some(DueDate::Naive(_))
        ));
        assert!(matches!(
            DueDate::parse("2024-03-10T08:15:30.250"),
            Some(DueDate::Naive(_))
        ));
    }

    #[test]
    fn garbage_and_missing_sort_as_epoch() {
        assert_eq!(sort_instant(None), 0);
        assert_eq!(sort_instant(Some("next tuesday")), 0);
        assert_eq!(sort_instant(Some("")), 0);
        assert!(sort_instant(Some("2024-01-01")) > 0);
    }
}

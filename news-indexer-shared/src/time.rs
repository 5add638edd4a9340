//! Calendar fields derived from publication timestamps.

use chrono::{DateTime, Datelike};

/// Year, month and ISO week (`YYYYWW`) of a publication timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishedDate {
    pub year: i32,
    pub month: i32,
    pub week: i32,
}

impl PublishedDate {
    /// Derive calendar fields from a Unix timestamp in seconds (UTC).
    ///
    /// Returns `None` for non-positive or unrepresentable timestamps.
    pub fn from_timestamp(timestamp: i64) -> Option<Self> {
        if timestamp <= 0 {
            return None;
        }
        let datetime = DateTime::from_timestamp(timestamp, 0)?;
        let iso = datetime.iso_week();

        Some(Self {
            year: datetime.year(),
            month: datetime.month() as i32,
            week: iso.year() * 100 + iso.week() as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week(timestamp: i64) -> Option<i32> {
        PublishedDate::from_timestamp(timestamp).map(|date| date.week)
    }

    #[test]
    fn test_published_week() {
        // 2024-01-01 12:00 UTC
        assert_eq!(week(1704110400), Some(202401));
        // 2024-10-23 00:00 UTC
        assert_eq!(week(1729641600), Some(202443));
    }

    #[test]
    fn test_iso_year_differs_from_calendar_year() {
        // 2021-01-01 belongs to ISO week 53 of 2020
        let date = PublishedDate::from_timestamp(1609459200).unwrap();
        assert_eq!(date.year, 2021);
        assert_eq!(date.month, 1);
        assert_eq!(date.week, 202053);
    }

    #[test]
    fn test_invalid_timestamps() {
        assert_eq!(week(0), None);
        assert_eq!(week(-5), None);
    }
}

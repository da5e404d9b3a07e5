// src/time.rs

//! Timestamp handling
//!
//! Every timestamp on the wire and in the database is UTC with second
//! precision, written as `%Y-%m-%dT%H:%M:%SZ` (ISO 8601).

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Format used for timestamps in JSON and SQLite
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a timestamp in [`TIME_FORMAT`]
pub fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            Error::ParseError(format!(
                "Failed to parse time (format: {}, str: {}): {}",
                TIME_FORMAT, s, e
            ))
        })
}

/// Format a timestamp in [`TIME_FORMAT`]
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Current UTC time truncated to whole seconds
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Serde adapter: `#[serde(with = "crate::time::iso8601")]`
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time(time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_time() {
        let t = parse_time("2025-11-26T08:30:15Z").unwrap();
        assert_eq!(t.year(), 2025);
        assert_eq!(t.month(), 11);
        assert_eq!(t.day(), 26);
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.second(), 15);
    }

    #[test]
    fn test_parse_time_rejects_other_formats() {
        assert!(parse_time("2025-11-26").is_err());
        assert!(parse_time("2025-11-26 00:00:00").is_err());
        assert!(parse_time("not a time").is_err());

        let err = parse_time("2025/11/26").unwrap_err().to_string();
        assert!(err.contains("2025/11/26"));
        assert!(err.contains(TIME_FORMAT));
    }

    #[test]
    fn test_format_time() {
        let t = parse_time("2099-11-26T00:00:00Z").unwrap();
        assert_eq!(format_time(&t), "2099-11-26T00:00:00Z");
    }

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(now().nanosecond(), 0);
    }
}

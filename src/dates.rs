//! Date parsing and formatting shared by every dated content kind.
//!
//! Post metadata stores publish dates as RFC 2822 strings
//! (`Mon, 02 Jan 2006 15:04:05 -0700`). Sidecars store RFC 3339 through
//! chrono's serde support. Career data uses two looser forms: `"2006 January"`
//! for job start dates and `"02 January 2006"` for game releases.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use std::time::SystemTime;

/// A publish instant with its original UTC offset.
pub type PubDate = DateTime<FixedOffset>;

/// Zero-padded RFC 2822 layout, the form feeds and post metadata use.
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

pub fn parse_pub_date(text: &str) -> Result<PubDate, chrono::ParseError> {
    DateTime::parse_from_rfc2822(text.trim())
}

pub fn format_pub_date(date: &PubDate) -> String {
    date.format(PUB_DATE_FORMAT).to_string()
}

/// Human-readable date: `1 March 2023`.
pub fn date_string(date: &PubDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Convert a filesystem timestamp into a publish instant in local time.
pub fn from_system_time(time: SystemTime) -> PubDate {
    DateTime::<Local>::from(time).fixed_offset()
}

fn midnight_utc(date: NaiveDate) -> PubDate {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .fixed_offset()
}

/// Parse a job start such as `"2015 March"` as the first of that month.
pub fn parse_month_year(text: &str) -> Option<PubDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(&format!("{text} 1"), "%Y %B %d")
        .ok()
        .map(midnight_utc)
}

/// Parse a game release date such as `"07 June 2019"`.
pub fn parse_release_date(text: &str) -> Option<PubDate> {
    NaiveDate::parse_from_str(text.trim(), "%d %B %Y")
        .ok()
        .map(midnight_utc)
}

/// Serde adapter for RFC 2822 publish dates in metadata files.
pub mod rfc2822 {
    use super::{PubDate, format_pub_date, parse_pub_date};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &PubDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_pub_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PubDate, D::Error> {
        use serde::de::Error;
        let text = String::deserialize(deserializer)?;
        parse_pub_date(&text).map_err(|e| Error::custom(format!("invalid pubDate {text:?}: {e}")))
    }
}

//! Time related utils.

use chrono::NaiveDateTime;
use chrono::Utc;

use crate::Error;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Basic ISO 8601 format used by signing: "20220313T072004Z"
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Length of a basic ISO 8601 timestamp.
pub const ISO8601_LEN: usize = 16;

/// Length of the date stamp prefix of a timestamp.
pub const DATE_LEN: usize = 8;

/// Create a new DateTime with current time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: "20220313"
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO 8601: "20220313T072004Z"
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Parse a basic ISO 8601 timestamp: "20220313T072004Z"
///
/// Only the exact 16 characters form is accepted.
pub fn parse_iso8601(s: &str) -> crate::Result<DateTime> {
    let shape_ok = s.len() == ISO8601_LEN
        && s.bytes().enumerate().all(|(i, b)| match i {
            DATE_LEN => b == b'T',
            15 => b == b'Z',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(Error::request_invalid(format!(
            "timestamp {s:?} is not in YYYYMMDDTHHMMSSZ form"
        )));
    }

    let t = NaiveDateTime::parse_from_str(s, ISO8601).map_err(|e| {
        Error::request_invalid(format!("timestamp {s:?} is not in YYYYMMDDTHHMMSSZ form"))
            .with_source(e)
    })?;
    Ok(t.and_utc())
}

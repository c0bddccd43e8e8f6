//! Parsing of the date-like strings found in CRM records.
//!
//! Everything is compared on local wall-clock time: timestamps carrying an
//! offset are converted to the local zone first, naive timestamps and bare
//! dates are taken as local already.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

const DAY_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// Parse a record's date-like value into local wall-clock time
pub fn parse_local(text: &str) -> Option<NaiveDateTime> {
  let text = text.trim();
  if text.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
    return Some(dt.with_timezone(&Local).naive_local());
  }

  for format in NAIVE_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
      return Some(dt);
    }
  }

  parse_day(text).map(|day| day.and_time(NaiveTime::MIN))
}

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_day(text: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), DAY_FORMAT).ok()
}

/// Format a calendar day as `YYYY-MM-DD`
pub fn format_day(day: NaiveDate) -> String {
  day.format(DAY_FORMAT).to_string()
}

/// Display form used in tables: `DD-MM-YYYY`, or "N/A" when unparseable
pub fn display_date(text: &str) -> String {
  match parse_local(text) {
    Some(dt) => dt.format("%d-%m-%Y").to_string(),
    None => "N/A".to_string(),
  }
}

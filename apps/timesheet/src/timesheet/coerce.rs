//! Text → typed value coercion for timesheet fields.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde_json::Value;

/// Accepted date layouts, tried in order: ISO, US short year, US full year.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", SHORT_YEAR_FORMAT, "%m/%d/%Y"];

const SHORT_YEAR_FORMAT: &str = "%m/%d/%y";

/// The text of a JSON scalar, or `None` for null, empty strings and
/// containers. Numbers and booleans are taken by their textual form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Two-digit years 00-68 land in the 2000s and 69-99 in the 1900s.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        let date = NaiveDate::parse_from_str(raw, fmt).ok()?;
        // chrono pivots at 70; "69" still belongs to the previous century.
        if *fmt == SHORT_YEAR_FORMAT && date.year() == 2069 {
            return date.with_year(1969);
        }
        Some(date)
    })
}

/// Parses `hour:minute`; anything after the minute component is ignored.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let mut parts = raw.trim().split(':');
    let hour = parts.next()?.trim().parse::<u32>().ok()?;
    let minute = parts.next()?.trim().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Finite floating-point value, or `None` when empty or unparseable.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

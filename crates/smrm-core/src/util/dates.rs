//! Age calculation and date/time formatting.
//!
//! Display helpers render in the host's local time zone. Inputs are accepted
//! as RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM[:SS]` local timestamps, or
//! bare `YYYY-MM-DD` calendar dates.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Placeholder shown for unparseable dates.
pub const INVALID_DATE: &str = "---";

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD` for a calendar date.
pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date, also accepting the date part of a timestamp.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    parse_local_datetime(input).map(|dt| dt.date())
}

/// Parse a timestamp into local wall-clock time.
pub fn parse_local_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Age in whole years on `today` for a birth date string.
///
/// A birthday that has not yet come round this year does not count.
pub fn calc_age_on(birth_date: &str, today: NaiveDate) -> Option<i32> {
    let birth = parse_date(birth_date)?;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// Age in whole years as of today.
pub fn calc_age(birth_date: &str) -> Option<i32> {
    calc_age_on(birth_date, today())
}

/// `YYYY/MM/DD HH:MM`, or `---` when the input does not parse.
pub fn format_date_time(input: &str) -> String {
    parse_local_datetime(input)
        .map(|dt| dt.format("%Y/%m/%d %H:%M").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `YYYY/MM/DD`, or `---` when the input does not parse.
pub fn format_date(input: &str) -> String {
    parse_date(input)
        .map(|date| date.format("%Y/%m/%d").to_string())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// `YYYY-MM-DDTHH:MM`, the value format of a datetime-local input.
pub fn format_date_time_local(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Month bucket `YYYY-MM` of a timestamp, used to group history entries.
pub fn month_label(input: &str) -> Option<String> {
    parse_local_datetime(input).map(|dt| dt.format("%Y-%m").to_string())
}

/// Normalise a user-entered visit time to a stored RFC 3339 timestamp.
///
/// Naive inputs are interpreted as local time.
pub fn to_stored_timestamp(input: &str) -> Option<String> {
    let local = parse_local_datetime(input)?;
    let resolved = local.and_local_timezone(Local).earliest()?;
    Some(
        resolved
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

//! Date and time formatting for API payloads

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-MM-DD`, or an empty string when there is no timestamp
pub fn format_date<Tz>(t: Option<&DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format_custom(t, DATE_FORMAT)
}

/// `YYYY-MM-DD HH:MM:SS`, or an empty string when there is no timestamp
pub fn format_datetime<Tz>(t: Option<&DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format_custom(t, DATE_TIME_FORMAT)
}

/// Format with a strftime layout; absent timestamps format as ""
pub fn format_custom<Tz>(t: Option<&DateTime<Tz>>, layout: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.map(|t| t.format(layout).to_string()).unwrap_or_default()
}

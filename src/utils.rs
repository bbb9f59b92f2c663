//! Small helpers for the regional calendar and log formatting.
//!
//! The crawl date and the retention cutoff are computed in one fixed UTC
//! offset so a run just after midnight in the region still lands on the
//! region's date, whatever the host timezone is.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use tracing::debug;

/// India Standard Time, the default calendar for crawl dates.
pub const DEFAULT_UTC_OFFSET: &str = "+05:30";

/// Today's date in the given fixed offset.
pub fn regional_today(offset: FixedOffset) -> NaiveDate {
    regional_date(Utc::now(), offset)
}

/// The calendar date of `instant` as seen in `offset`.
pub fn regional_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let date = instant.with_timezone(&offset).date_naive();
    debug!(%instant, %offset, %date, "Computed regional date");
    date
}

/// The single crawl date that falls out of the retention window today.
///
/// `None` when the cutoff would precede the earliest date chrono can represent.
///
/// # Examples
///
/// ```ignore
/// let today = NaiveDate::from_ymd_opt(2025, 3, 13).unwrap();
/// assert_eq!(retention_cutoff(today, 7), NaiveDate::from_ymd_opt(2025, 3, 6));
/// ```
pub fn retention_cutoff(today: NaiveDate, retention_days: u32) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(u64::from(retention_days)))
}

/// Parse a `±HH:MM` offset for use as a clap value parser.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
/// assert!(parse_utc_offset("IST").is_err());
/// ```
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, String> {
    let invalid = || format!("invalid UTC offset `{s}`, expected ±HH:MM");

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a char boundary) with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

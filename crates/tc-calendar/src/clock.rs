//! Time-of-day helpers and date/time composition in a time zone.
//!
//! Schedule values are `HH:MM:SS` wall-clock times.  [`compose`] turns a
//! calendar date plus one of those times into an absolute UTC instant in the
//! zone the hour table is written in.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tc_core::errors::{Error, Result};

/// `23:59:59`. A close at this time means "open through end of day".
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(t) => t,
    None => panic!("23:59:59 is a valid time"),
};

/// `00:00:00`.
pub const MIDNIGHT: NaiveTime = match NaiveTime::from_hms_opt(0, 0, 0) {
    Some(t) => t,
    None => panic!("00:00:00 is a valid time"),
};

/// Parse a 24-hour `HH:MM:SS` (or `HH:MM`) time-of-day.
pub fn parse_hms(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| Error::Parse(format!("invalid time of day '{s}': {e}")))
}

/// Format a time-of-day as `HH:MM:SS`.
pub fn format_hms(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// Resolve a local wall-clock moment in `zone` to a UTC instant.
///
/// Fall-back overlaps take the earlier instant.  Spring-forward gaps are
/// shifted forward by the length of the gap (02:30 in a one-hour gap becomes
/// 03:30 local).
pub fn local_to_utc(zone: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(t) => Ok(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Offsets either side of the gap give the gap length.
            let before = zone.offset_from_utc_datetime(&(local - Duration::days(1)));
            let after = zone.offset_from_utc_datetime(&(local + Duration::days(1)));
            let gap = chrono::Offset::fix(&after).local_minus_utc()
                - chrono::Offset::fix(&before).local_minus_utc();
            zone.from_local_datetime(&(local + Duration::seconds(i64::from(gap.max(0)))))
                .earliest()
                .map(|t| t.with_timezone(&Utc))
                .ok_or_else(|| {
                    Error::Configuration(format!("{local} does not exist in zone {}", zone.name()))
                })
        }
    }
}

/// Compose `date` and `time` in `zone` into a UTC instant.
pub fn compose(zone: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
    local_to_utc(zone, date.and_time(time))
}

/// Calendar date of `instant` in `zone`.
pub fn local_date(zone: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&zone).date_naive()
}

/// Previous calendar day.
pub(crate) fn pred(date: NaiveDate) -> Result<NaiveDate> {
    date.pred_opt()
        .ok_or_else(|| Error::InvalidArgument(format!("no day before {date}")))
}

/// Next calendar day.
pub(crate) fn succ(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| Error::InvalidArgument(format!("no day after {date}")))
}

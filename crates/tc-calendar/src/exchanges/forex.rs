//! Forex-style exchange.
//!
//! Hours are published in UTC and shift by one hour with New York daylight
//! saving time:
//!
//! | | standard | DST |
//! |---|---|---|
//! | Sunday open | 22:35 | 21:35 |
//! | Friday close | 21:55 | 20:55 |
//!
//! Monday to Thursday trade around the clock.

use chrono_tz::America::New_York;
use tc_core::errors::Result;

use crate::clock::parse_hms;
use crate::dst::DstVariant;
use crate::exchange::Exchange;
use crate::schedule::{AdjustmentRule, DaySession, ExchangeSchedule, HoursField};
use crate::weekday::{Weekday, WeekdaySet};

/// Build a forex-style exchange named `symbol`.
pub fn forex(symbol: &str) -> Result<Exchange> {
    let end = DaySession::full_day().close;
    let schedule = ExchangeSchedule::builder()
        .trading_days(WeekdaySet::SUNDAY_TO_FRIDAY)
        .daily_hours(DaySession::full_day())
        .hours(
            Weekday::Sunday,
            DstVariant::Standard,
            DaySession::new(parse_hms("22:35:00")?, end),
        )
        .hours(
            Weekday::Sunday,
            DstVariant::Daylight,
            DaySession::new(parse_hms("21:35:00")?, end),
        )
        .adjustment(AdjustmentRule::labelled(
            Weekday::Friday,
            DstVariant::Standard,
            HoursField::DailyClose,
            parse_hms("21:55:00")?,
        ))
        .adjustment(AdjustmentRule::labelled(
            Weekday::Friday,
            DstVariant::Daylight,
            HoursField::DailyClose,
            parse_hms("20:55:00")?,
        ))
        .build()?;
    Ok(Exchange::new(symbol, New_York, schedule).with_category("forex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_hours_track_dst() {
        let ex = forex("EURUSD").unwrap();
        let standard = ex.schedule().session(Weekday::Sunday, DstVariant::Standard).unwrap();
        let daylight = ex.schedule().session(Weekday::Sunday, DstVariant::Daylight).unwrap();
        assert_eq!(standard.open, parse_hms("22:35:00").unwrap());
        assert_eq!(daylight.open, parse_hms("21:35:00").unwrap());
        assert!(!ex.schedule().trades_on_weekday(Weekday::Saturday));
    }

    #[test]
    fn friday_rules_are_labelled() {
        let ex = forex("EURUSD").unwrap();
        let labels: Vec<_> = ex
            .schedule()
            .adjustment_rules()
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, ["Fridays", "Fridays (DST)"]);
        assert_eq!(ex.category(), Some("forex"));
    }
}

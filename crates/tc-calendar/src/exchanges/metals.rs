//! Metals-style exchange.
//!
//! Trades Sunday to Friday around the clock in UTC, except that Sunday opens
//! late and Friday closes early, both one hour earlier under New York DST:
//!
//! | rule | standard | DST |
//! |---|---|---|
//! | Sundays, `daily_open` | 23:00 | 22:00 |
//! | Fridays, `daily_close` | 20:45 | 19:45 |

use chrono_tz::America::New_York;
use tc_core::errors::Result;

use crate::clock::parse_hms;
use crate::dst::DstVariant;
use crate::exchange::Exchange;
use crate::schedule::{AdjustmentRule, DaySession, ExchangeSchedule, HoursField};
use crate::weekday::{Weekday, WeekdaySet};

/// Build a metals-style exchange named `symbol`.
pub fn metals(symbol: &str) -> Result<Exchange> {
    let mut builder = ExchangeSchedule::builder()
        .trading_days(WeekdaySet::SUNDAY_TO_FRIDAY)
        .daily_hours(DaySession::full_day());
    for (variant, open, close) in [
        (DstVariant::Standard, "23:00:00", "20:45:00"),
        (DstVariant::Daylight, "22:00:00", "19:45:00"),
    ] {
        builder = builder
            .adjustment(AdjustmentRule::labelled(
                Weekday::Sunday,
                variant,
                HoursField::DailyOpen,
                parse_hms(open)?,
            ))
            .adjustment(AdjustmentRule::labelled(
                Weekday::Friday,
                variant,
                HoursField::DailyClose,
                parse_hms(close)?,
            ));
    }
    Ok(Exchange::new(symbol, New_York, builder.build()?).with_category("metals"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_per_variant() {
        let ex = metals("M").unwrap();
        let sunday: Vec<_> = ex
            .schedule()
            .rules_for(Weekday::Sunday, DstVariant::Daylight)
            .collect();
        assert_eq!(sunday.len(), 1);
        assert_eq!(sunday[0].label, "Sundays (DST)");
        assert_eq!(sunday[0].time, parse_hms("22:00:00").unwrap());
        assert_eq!(ex.schedule().rules_for(Weekday::Monday, DstVariant::Standard).count(), 0);
    }
}

//! 24/7 crypto exchange.

use chrono_tz::Tz;
use tc_core::errors::Result;

use crate::exchange::Exchange;
use crate::schedule::{DaySession, ExchangeSchedule};
use crate::weekday::WeekdaySet;

/// Build an exchange named `symbol` that trades every second of every day.
pub fn crypto(symbol: &str) -> Result<Exchange> {
    let schedule = ExchangeSchedule::builder()
        .trading_days(WeekdaySet::ALL)
        .daily_hours(DaySession::full_day())
        .build()?;
    Ok(Exchange::new(symbol, Tz::UTC, schedule).with_category("crypto"))
}

//! Exchange schedule: the static weekly definition of when a venue trades.
//!
//! An [`ExchangeSchedule`] holds the weekly trading-day set, one
//! [`DaySession`] per trading weekday and DST variant, the intraday
//! [`TradingBreak`]s, and the periodic [`AdjustmentRule`]s.  Exchange
//! categories differ only in this data; there is no per-category code.
//!
//! Schedules are built once through [`ExchangeScheduleBuilder`], which
//! rejects inconsistent hour tables, and are never mutated afterwards.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Deserialize;
use tc_core::ensure;
use tc_core::errors::{Error, Result};

use crate::clock::{format_hms, END_OF_DAY, MIDNIGHT};
use crate::dst::DstVariant;
use crate::weekday::{Weekday, WeekdaySet};

/// Open and close time-of-day of one weekday in one DST variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaySession {
    /// Opening time-of-day.
    pub open: NaiveTime,
    /// Closing time-of-day.  `23:59:59` means "through end of day".
    pub close: NaiveTime,
    /// The session starts on the evening of the previous calendar day.
    pub opens_previous_day: bool,
}

impl DaySession {
    /// A same-day session.
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open,
            close,
            opens_previous_day: false,
        }
    }

    /// `00:00:00`–`23:59:59`.
    pub fn full_day() -> Self {
        Self::new(MIDNIGHT, END_OF_DAY)
    }

    /// A session opening at `open` on the previous evening and closing at
    /// `close` on the trading date.
    pub fn overnight(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open,
            close,
            opens_previous_day: true,
        }
    }

    /// Return `true` for a `00:00:00`–`23:59:59` session.
    pub fn is_full_day(&self) -> bool {
        !self.opens_previous_day && self.open == MIDNIGHT && self.close == END_OF_DAY
    }

    /// Whether a time-of-day of this session falls on the previous calendar
    /// day.  For a cross-midnight session that is every time after the close,
    /// so an adjusted open earlier than the base open still lands on the
    /// previous evening.
    pub fn is_previous_day_time(&self, time: NaiveTime) -> bool {
        self.opens_previous_day && time > self.close
    }

    fn validate(&self, day: Weekday, variant: DstVariant) -> Result<()> {
        if self.opens_previous_day {
            ensure!(
                self.close <= self.open,
                "{day} ({variant}): overnight session {}–{} spans more than 24 hours",
                format_hms(self.open),
                format_hms(self.close)
            );
        } else {
            ensure!(
                self.open < self.close,
                "{day} ({variant}): open {} is not before close {}",
                format_hms(self.open),
                format_hms(self.close)
            );
        }
        Ok(())
    }
}

/// An intraday interval during which the exchange is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingBreak {
    /// Break start time-of-day (inclusive).
    pub start: NaiveTime,
    /// Break end time-of-day (exclusive).
    pub end: NaiveTime,
}

impl TradingBreak {
    /// Create a break.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// Which end of the session a rule or override adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursField {
    /// The daily opening time.
    DailyOpen,
    /// The daily closing time.
    DailyClose,
}

impl HoursField {
    /// Wire name: `daily_open` / `daily_close`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HoursField::DailyOpen => "daily_open",
            HoursField::DailyClose => "daily_close",
        }
    }
}

impl std::fmt::Display for HoursField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring weekday + DST-variant deviation from the base hours, e.g.
/// "every Friday closes at 21:55".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdjustmentRule {
    /// Weekday the rule applies to.
    pub weekday: Weekday,
    /// DST variant the rule applies to.
    pub variant: DstVariant,
    /// Field replaced by the rule.
    pub field: HoursField,
    /// Replacement time-of-day.
    pub time: NaiveTime,
    /// Human-readable label, e.g. `"Fridays (DST)"`.
    pub label: String,
}

impl AdjustmentRule {
    /// Create a rule with an explicit label.
    pub fn new(
        weekday: Weekday,
        variant: DstVariant,
        field: HoursField,
        time: NaiveTime,
        label: impl Into<String>,
    ) -> Self {
        Self {
            weekday,
            variant,
            field,
            time,
            label: label.into(),
        }
    }

    /// Create a rule labelled the conventional way: `"Fridays"` in standard
    /// time, `"Fridays (DST)"` in daylight-saving time.
    pub fn labelled(
        weekday: Weekday,
        variant: DstVariant,
        field: HoursField,
        time: NaiveTime,
    ) -> Self {
        let label = match variant {
            DstVariant::Standard => weekday.plural(),
            DstVariant::Daylight => format!("{} (DST)", weekday.plural()),
        };
        Self::new(weekday, variant, field, time, label)
    }

    /// Return `true` if the rule applies to `weekday` in `variant`.
    pub fn applies_to(&self, weekday: Weekday, variant: DstVariant) -> bool {
        self.weekday == weekday && self.variant == variant
    }
}

/// The immutable weekly definition of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeSchedule {
    trading_days: WeekdaySet,
    hours: BTreeMap<(Weekday, DstVariant), DaySession>,
    breaks: Vec<TradingBreak>,
    adjustments: Vec<AdjustmentRule>,
}

impl ExchangeSchedule {
    /// Start building a schedule.
    pub fn builder() -> ExchangeScheduleBuilder {
        ExchangeScheduleBuilder::default()
    }

    /// Weekdays on which the exchange nominally trades.
    pub fn trading_days(&self) -> WeekdaySet {
        self.trading_days
    }

    /// Return `true` if `weekday` is a nominal trading day.
    pub fn trades_on_weekday(&self, weekday: Weekday) -> bool {
        self.trading_days.contains(weekday)
    }

    /// Base session for `weekday` in `variant`.
    ///
    /// Missing hours for a day the exchange trades is a configuration error.
    pub fn session(&self, weekday: Weekday, variant: DstVariant) -> Result<&DaySession> {
        self.hours.get(&(weekday, variant)).ok_or_else(|| {
            Error::Configuration(format!("no {variant} hours defined for {weekday}"))
        })
    }

    /// Intraday breaks, ordered by start time.
    pub fn breaks(&self) -> &[TradingBreak] {
        &self.breaks
    }

    /// All periodic adjustment rules, in declaration order.
    pub fn adjustment_rules(&self) -> &[AdjustmentRule] {
        &self.adjustments
    }

    /// Periodic rules matching `weekday` in `variant`, in declaration order.
    pub fn rules_for(
        &self,
        weekday: Weekday,
        variant: DstVariant,
    ) -> impl Iterator<Item = &AdjustmentRule> + '_ {
        self.adjustments
            .iter()
            .filter(move |r| r.applies_to(weekday, variant))
    }
}

/// Builder for [`ExchangeSchedule`].
#[derive(Debug, Clone, Default)]
pub struct ExchangeScheduleBuilder {
    trading_days: WeekdaySet,
    hours: BTreeMap<(Weekday, DstVariant), DaySession>,
    breaks: Vec<TradingBreak>,
    adjustments: Vec<AdjustmentRule>,
}

impl ExchangeScheduleBuilder {
    /// Set the weekly trading-day set.
    pub fn trading_days(mut self, days: WeekdaySet) -> Self {
        self.trading_days = days;
        self
    }

    /// Set the session of `weekday` in `variant`.
    pub fn hours(mut self, weekday: Weekday, variant: DstVariant, session: DaySession) -> Self {
        self.hours.insert((weekday, variant), session);
        self
    }

    /// Set the session of `weekday` in both variants.
    pub fn hours_all_year(self, weekday: Weekday, session: DaySession) -> Self {
        self.hours(weekday, DstVariant::Standard, session)
            .hours(weekday, DstVariant::Daylight, session)
    }

    /// Set the session of every trading day in both variants.  Call after
    /// [`trading_days`](Self::trading_days).
    pub fn daily_hours(mut self, session: DaySession) -> Self {
        for day in self.trading_days.iter().collect::<Vec<_>>() {
            self = self.hours_all_year(day, session);
        }
        self
    }

    /// Add an intraday break.
    pub fn trading_break(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.breaks.push(TradingBreak::new(start, end));
        self
    }

    /// Add a periodic adjustment rule.
    pub fn adjustment(mut self, rule: AdjustmentRule) -> Self {
        self.adjustments.push(rule);
        self
    }

    /// Validate and build the schedule.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the exchange trades on no day, a trading
    /// weekday lacks hours in either variant, a session is inverted, or the
    /// breaks are empty or overlap.
    pub fn build(mut self) -> Result<ExchangeSchedule> {
        ensure!(!self.trading_days.is_empty(), "schedule has no trading days");
        for day in self.trading_days.iter() {
            for variant in DstVariant::BOTH {
                match self.hours.get(&(day, variant)) {
                    Some(session) => session.validate(day, variant)?,
                    None => tc_core::fail!("no {variant} hours defined for {day}"),
                }
            }
        }

        self.breaks.sort();
        for b in &self.breaks {
            ensure!(
                b.start < b.end,
                "break {}–{} is empty or inverted",
                format_hms(b.start),
                format_hms(b.end)
            );
        }
        for pair in self.breaks.windows(2) {
            ensure!(
                pair[0].end <= pair[1].start,
                "breaks {}–{} and {}–{} overlap",
                format_hms(pair[0].start),
                format_hms(pair[0].end),
                format_hms(pair[1].start),
                format_hms(pair[1].end)
            );
        }

        Ok(ExchangeSchedule {
            trading_days: self.trading_days,
            hours: self.hours,
            breaks: self.breaks,
            adjustments: self.adjustments,
        })
    }
}

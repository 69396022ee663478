//! The trading-calendar resolution engine.
//!
//! [`TradingCalendar`] answers every query about an [`Exchange`] by layering
//! three sources for the requested date:
//!
//! 1. the exchange's base session for the date's weekday, in the DST variant
//!    the [`DstOracle`] selects;
//! 2. the periodic adjustment rules for that weekday and variant;
//! 3. the date-keyed overrides (holidays, early closes, late opens) of one
//!    [`CalendarOverrides`] snapshot.
//!
//! The engine holds no mutable state.  Every operation is a pure read, so a
//! single engine can be shared across threads.
//!
//! # Time-of-day placement
//!
//! Times-of-day are composed onto the trading date in the exchange's hours
//! zone.  For a session that opens on the previous evening, any
//! time-of-day after the base closing time (the open itself, an adjusted
//! open, a break) lands on the previous calendar day.  Closing times always
//! land on the trading date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tc_core::errors::{Error, Result};
use tc_core::settings::EngineSettings;
use tc_core::Seconds;
use tracing::{trace, warn};

use crate::clock::{self, END_OF_DAY};
use crate::dst::{self, DstOracle, DstVariant};
use crate::exchange::Exchange;
use crate::overrides::CalendarOverrides;
use crate::provider::CalendarProvider;
use crate::rules::{self, OverrideLayer, PeriodicLayer, Resolution, ScheduleLayer};
use crate::schedule::{DaySession, HoursField};
use crate::weekday::Weekday;
use crate::window::{Adjustment, AdjustmentDescriptor, Interval, TradingWindow};

/// Open and close of one trading date after rule layering.
#[derive(Debug)]
struct ResolvedDay<'e> {
    session: &'e DaySession,
    open: Resolution,
    close: Resolution,
}

/// Resolution engine over one calendar snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TradingCalendar<'a> {
    overrides: &'a CalendarOverrides,
    settings: EngineSettings,
    oracle: DstOracle,
}

impl<'a> TradingCalendar<'a> {
    /// Create an engine over `overrides` with default settings.
    pub fn new(overrides: &'a CalendarOverrides) -> Self {
        Self::with_settings(overrides, EngineSettings::default())
    }

    /// Create an engine over `overrides` with explicit settings.
    pub fn with_settings(overrides: &'a CalendarOverrides, settings: EngineSettings) -> Self {
        Self {
            overrides,
            settings,
            oracle: DstOracle::new(settings.dst_reference),
        }
    }

    /// Create an engine over the snapshot `id` (or the current snapshot) of
    /// `provider`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if the provider has no such snapshot.
    pub fn from_provider<P>(
        provider: &'a P,
        id: Option<&str>,
        settings: EngineSettings,
    ) -> Result<Self>
    where
        P: CalendarProvider + ?Sized,
    {
        let overrides = provider.snapshot(id).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no calendar snapshot '{}'",
                id.unwrap_or("<current>")
            ))
        })?;
        Ok(Self::with_settings(overrides, settings))
    }

    /// Settings in use.
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// The override snapshot in use.
    pub fn overrides(&self) -> &'a CalendarOverrides {
        self.overrides
    }

    // ── DST ──────────────────────────────────────────────────────────────────

    /// Return `true` if the exchange's governing zone observes DST at
    /// `instant`.
    pub fn is_dst(&self, exchange: &Exchange, instant: DateTime<Utc>) -> bool {
        dst::is_dst(exchange.time_zone(), instant)
    }

    /// Hour-table variant in effect for trading date `date`.
    pub fn dst_variant_on(&self, exchange: &Exchange, date: NaiveDate) -> Result<DstVariant> {
        self.oracle.variant_on(exchange.time_zone(), date)
    }

    // ── Internal resolution ──────────────────────────────────────────────────

    /// Base session for `date`, or `None` if the weekday is not a trading day.
    fn base_session<'e>(
        &self,
        exchange: &'e Exchange,
        date: NaiveDate,
    ) -> Result<Option<(Weekday, DstVariant, &'e DaySession)>> {
        let weekday = Weekday::of(date);
        let schedule = exchange.schedule();
        if !schedule.trades_on_weekday(weekday) {
            return Ok(None);
        }
        let variant = self.dst_variant_on(exchange, date)?;
        let session = schedule.session(weekday, variant)?;
        Ok(Some((weekday, variant, session)))
    }

    fn resolve_day<'e>(
        &self,
        exchange: &'e Exchange,
        date: NaiveDate,
    ) -> Result<Option<ResolvedDay<'e>>> {
        let Some((weekday, variant, session)) = self.base_session(exchange, date)? else {
            return Ok(None);
        };
        if self.overrides.holiday_for_exchange(exchange, date).is_some() {
            return Ok(None);
        }

        let base = ScheduleLayer::new(session);
        let periodic = PeriodicLayer::new(exchange.schedule().rules_for(weekday, variant));
        let one_off = OverrideLayer::new(
            self.overrides.late_open_for_exchange(exchange, date),
            self.overrides.early_close_for_exchange(exchange, date),
        );
        let chain: [&dyn rules::HoursSource; 3] = [&base, &periodic, &one_off];

        let open = rules::resolve(HoursField::DailyOpen, &chain)
            .ok_or_else(|| Error::Configuration(format!("no opening time for {weekday}")))?;
        let close = rules::resolve(HoursField::DailyClose, &chain)
            .ok_or_else(|| Error::Configuration(format!("no closing time for {weekday}")))?;

        trace!(
            symbol = exchange.symbol(),
            %date,
            %variant,
            open = %clock::format_hms(open.time),
            open_origin = ?open.origin,
            close = %clock::format_hms(close.time),
            close_origin = ?close.origin,
            "resolved trading hours"
        );
        Ok(Some(ResolvedDay {
            session,
            open,
            close,
        }))
    }

    /// Instant of an opening-side time-of-day of `session` on `date`.
    fn place(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
        session: &DaySession,
        time: NaiveTime,
    ) -> Result<DateTime<Utc>> {
        let day = if session.is_previous_day_time(time) {
            clock::pred(date)?
        } else {
            date
        };
        clock::compose(exchange.hours_zone(), day, time)
    }

    /// Instant of a closing time-of-day on `date`.
    fn place_close(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<DateTime<Utc>> {
        clock::compose(exchange.hours_zone(), date, time)
    }

    fn scan_exhausted(&self, exchange: &Exchange, from: NaiveDate, what: &str) -> Error {
        warn!(
            symbol = exchange.symbol(),
            %from,
            limit = self.settings.max_scan_days,
            what,
            "scan ceiling reached"
        );
        Error::ScanLimitExceeded {
            symbol: exchange.symbol().to_string(),
            from,
            limit: self.settings.max_scan_days,
        }
    }

    // ── Trading days ─────────────────────────────────────────────────────────

    /// Return `true` if the exchange trades on `date`: the weekday is a
    /// nominal trading day and no holiday applies.  Early closes and late
    /// opens still count as trading.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the schedule lacks hours for the weekday.
    pub fn trades_on(&self, exchange: &Exchange, date: NaiveDate) -> Result<bool> {
        Ok(self.base_session(exchange, date)?.is_some()
            && self.overrides.holiday_for_exchange(exchange, date).is_none())
    }

    /// Name of the holiday on `date` for a scope tag (exchange symbol,
    /// category, or country code).
    pub fn is_holiday_for(&self, scope: &str, date: NaiveDate) -> Option<&'a str> {
        self.overrides.holiday_for(scope, date)
    }

    /// Nearest trading date strictly before `date`.
    ///
    /// # Errors
    /// [`Error::ScanLimitExceeded`] if none lies within the scan ceiling.
    pub fn trade_date_before(&self, exchange: &Exchange, date: NaiveDate) -> Result<NaiveDate> {
        let mut candidate = date;
        for _ in 0..self.settings.max_scan_days {
            candidate = clock::pred(candidate)?;
            if self.trades_on(exchange, candidate)? {
                return Ok(candidate);
            }
        }
        Err(self.scan_exhausted(exchange, date, "trade_date_before"))
    }

    /// Nearest trading date strictly after `date`.
    ///
    /// # Errors
    /// [`Error::ScanLimitExceeded`] if none lies within the scan ceiling.
    pub fn trade_date_after(&self, exchange: &Exchange, date: NaiveDate) -> Result<NaiveDate> {
        let mut candidate = date;
        for _ in 0..self.settings.max_scan_days {
            candidate = clock::succ(candidate)?;
            if self.trades_on(exchange, candidate)? {
                return Ok(candidate);
            }
        }
        Err(self.scan_exhausted(exchange, date, "trade_date_after"))
    }

    /// Number of trading dates strictly between `d1` and `d2`, in either
    /// order.
    pub fn trading_days_between(
        &self,
        exchange: &Exchange,
        d1: NaiveDate,
        d2: NaiveDate,
    ) -> Result<u32> {
        let mut count = 0;
        for date in strictly_between(d1, d2) {
            if self.trades_on(exchange, date)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Number of nominal trading weekdays strictly between `d1` and `d2`
    /// that are holidays for the exchange.
    pub fn holiday_days_between(
        &self,
        exchange: &Exchange,
        d1: NaiveDate,
        d2: NaiveDate,
    ) -> Result<u32> {
        let mut count = 0;
        for date in strictly_between(d1, d2) {
            if self.base_session(exchange, date)?.is_some() && !self.trades_on(exchange, date)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Every trading date in `[from, to]`.
    pub fn trading_dates(
        &self,
        exchange: &Exchange,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            if self.trades_on(exchange, date)? {
                dates.push(date);
            }
        }
        Ok(dates)
    }

    // ── Session boundaries ───────────────────────────────────────────────────

    /// The concrete session of `date`: open, close, and clipped breaks.
    /// `None` when the exchange does not trade that day.
    pub fn trading_window(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Result<Option<TradingWindow>> {
        let Some(day) = self.resolve_day(exchange, date)? else {
            return Ok(None);
        };
        let open = self.place(exchange, date, day.session, day.open.time)?;
        let close = self.place_close(exchange, date, day.close.time)?;
        let end = if day.close.time == END_OF_DAY {
            close + Duration::seconds(1)
        } else {
            close
        };

        let mut breaks = Vec::new();
        for b in exchange.schedule().breaks() {
            let start = self.place(exchange, date, day.session, b.start)?.max(open);
            let stop = self.place(exchange, date, day.session, b.end)?.min(end);
            if start < stop {
                breaks.push(Interval::new(start, stop));
            }
        }
        breaks.sort();

        Ok(Some(TradingWindow::new(date, open, close, end, breaks)))
    }

    /// Opening instant on `date`, after overrides and periodic rules.
    pub fn opening_on(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(day) = self.resolve_day(exchange, date)? else {
            return Ok(None);
        };
        self.place(exchange, date, day.session, day.open.time).map(Some)
    }

    /// Closing instant on `date`, after overrides and periodic rules.
    pub fn closing_on(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(day) = self.resolve_day(exchange, date)? else {
            return Ok(None);
        };
        self.place_close(exchange, date, day.close.time).map(Some)
    }

    /// The resolved close on `date` if it is strictly earlier than the base
    /// schedule's close for that weekday and variant.
    pub fn closes_early_on(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Result<Option<DateTime<Utc>>> {
        let Some(day) = self.resolve_day(exchange, date)? else {
            return Ok(None);
        };
        let base = self.place_close(exchange, date, day.session.close)?;
        let resolved = self.place_close(exchange, date, day.close.time)?;
        Ok((resolved < base).then_some(resolved))
    }

    /// Return `true` if the resolved open on `date` is strictly later than
    /// the base schedule's open.
    pub fn opens_late_on(&self, exchange: &Exchange, date: NaiveDate) -> Result<bool> {
        let Some(day) = self.resolve_day(exchange, date)? else {
            return Ok(false);
        };
        let base = self.place(exchange, date, day.session, day.session.open)?;
        let resolved = self.place(exchange, date, day.session, day.open.time)?;
        Ok(resolved > base)
    }

    /// Periodic-rule deviations for `date`'s weekday and DST variant.  One-off
    /// overrides are not reported; holidays do not suppress the result.
    pub fn regularly_adjusts_trading_hours_on(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Result<AdjustmentDescriptor> {
        let mut descriptor = AdjustmentDescriptor::default();
        let Some((weekday, variant, session)) = self.base_session(exchange, date)? else {
            return Ok(descriptor);
        };
        let periodic = PeriodicLayer::new(exchange.schedule().rules_for(weekday, variant));
        if let Some(rule) = periodic.rule(HoursField::DailyOpen) {
            descriptor.insert(
                HoursField::DailyOpen,
                Adjustment {
                    time: self.place(exchange, date, session, rule.time)?,
                    rule: rule.label.clone(),
                },
            );
        }
        if let Some(rule) = periodic.rule(HoursField::DailyClose) {
            descriptor.insert(
                HoursField::DailyClose,
                Adjustment {
                    time: self.place_close(exchange, date, rule.time)?,
                    rule: rule.label.clone(),
                },
            );
        }
        Ok(descriptor)
    }

    /// Intraday breaks on `date` as instants, clipped to the session.  Empty
    /// when the exchange does not trade.
    pub fn trading_breaks(&self, exchange: &Exchange, date: NaiveDate) -> Result<Vec<Interval>> {
        Ok(self
            .trading_window(exchange, date)?
            .map(|w| w.breaks)
            .unwrap_or_default())
    }

    // ── Instants ─────────────────────────────────────────────────────────────

    /// The trading date `instant` belongs to.
    ///
    /// An instant inside a session (breaks included) belongs to that
    /// session's date, which for a session opening the previous evening is
    /// the next calendar day.  An instant outside every session belongs to
    /// its own calendar date in the hours zone.
    ///
    /// # Errors
    /// [`Error::AmbiguousTradingDate`] if two sessions claim the instant.
    pub fn trading_date_for(
        &self,
        exchange: &Exchange,
        instant: DateTime<Utc>,
    ) -> Result<NaiveDate> {
        let day = clock::local_date(exchange.hours_zone(), instant);
        let next = clock::succ(day)?;

        let mut owners = Vec::with_capacity(2);
        for candidate in [day, next] {
            if let Some(window) = self.trading_window(exchange, candidate)? {
                if window.in_session(instant) {
                    owners.push(candidate);
                }
            }
        }
        match owners.as_slice() {
            [] => Ok(day),
            [owner] => Ok(*owner),
            _ => {
                warn!(
                    symbol = exchange.symbol(),
                    %instant,
                    candidates = ?owners,
                    "overlapping sessions claim the same instant"
                );
                Err(Error::AmbiguousTradingDate {
                    symbol: exchange.symbol().to_string(),
                    instant,
                })
            }
        }
    }

    /// Return `true` if the exchange is open at `instant`.
    pub fn is_open_at(&self, exchange: &Exchange, instant: DateTime<Utc>) -> Result<bool> {
        let date = self.trading_date_for(exchange, instant)?;
        Ok(self
            .trading_window(exchange, date)?
            .is_some_and(|w| w.contains(instant)))
    }

    /// Seconds of trading in `[t1, t2)`, breaks excluded.  Zero when
    /// `t1 >= t2`.
    pub fn seconds_of_trading_between_epochs(
        &self,
        exchange: &Exchange,
        t1: DateTime<Utc>,
        t2: DateTime<Utc>,
    ) -> Result<Seconds> {
        if t1 >= t2 {
            return Ok(0);
        }
        let zone = exchange.hours_zone();
        let first = clock::local_date(zone, t1);
        // A session opening the previous evening can start before t2's date ends.
        let last = clock::succ(clock::local_date(zone, t2))?;

        let mut total = 0;
        for date in first.iter_days().take_while(|d| *d <= last) {
            if let Some(window) = self.trading_window(exchange, date)? {
                total += window.open_seconds_between(t1, t2);
            }
        }
        Ok(total)
    }

    /// The next instant after `instant` at which the exchange opens, or
    /// `None` if it is already open.
    ///
    /// # Errors
    /// [`Error::ScanLimitExceeded`] if no opening lies within the scan
    /// ceiling.
    pub fn next_open_at(
        &self,
        exchange: &Exchange,
        instant: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        if self.is_open_at(exchange, instant)? {
            return Ok(None);
        }
        let start = clock::local_date(exchange.hours_zone(), instant);
        let mut date = start;
        for _ in 0..=self.settings.max_scan_days {
            if let Some(window) = self.trading_window(exchange, date)? {
                if let Some(segment) = window.segments().into_iter().find(|s| s.start > instant) {
                    return Ok(Some(segment.start));
                }
            }
            date = clock::succ(date)?;
        }
        Err(self.scan_exhausted(exchange, start, "next_open_at"))
    }

    /// The next instant after `instant` at which the exchange closes, or
    /// `None` if it is already closed.  Back-to-back sessions (a close at
    /// `23:59:59` followed by a `00:00:00` open) are treated as one.
    ///
    /// # Errors
    /// [`Error::ScanLimitExceeded`] if the exchange stays open past the scan
    /// ceiling, as a 24/7 venue does.
    pub fn next_close_at(
        &self,
        exchange: &Exchange,
        instant: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>> {
        if !self.is_open_at(exchange, instant)? {
            return Ok(None);
        }
        let start = self.trading_date_for(exchange, instant)?;
        let mut date = start;
        let mut stretch_end: Option<DateTime<Utc>> = None;
        for _ in 0..=self.settings.max_scan_days {
            let segments = self
                .trading_window(exchange, date)?
                .map(|w| w.segments())
                .unwrap_or_default();
            if segments.is_empty() {
                if let Some(end) = stretch_end {
                    return Ok(Some(end));
                }
            }
            for segment in segments.into_iter().filter(|s| s.end > instant) {
                match stretch_end {
                    Some(end) if segment.start != end => return Ok(Some(end)),
                    _ => stretch_end = Some(segment.end),
                }
            }
            date = clock::succ(date)?;
        }
        Err(self.scan_exhausted(exchange, start, "next_close_at"))
    }
}

/// Dates strictly between `d1` and `d2`, in either order.
fn strictly_between(d1: NaiveDate, d2: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let (lo, hi) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
    lo.iter_days().skip(1).take_while(move |d| *d < hi)
}

//! Derived, per-date results of the resolution engine.
//!
//! Nothing here is stored: the engine rebuilds these values on every query
//! from the schedule, the override table, and the DST oracle.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tc_core::Seconds;

use crate::schedule::HoursField;

/// A half-open `[start, end)` span of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    /// First instant inside the interval.
    pub start: DateTime<Utc>,
    /// First instant after the interval.
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Return `true` if `instant` lies in `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length in whole seconds (zero for an empty interval).
    pub fn seconds(&self) -> Seconds {
        (self.end - self.start).num_seconds().max(0)
    }

    /// Seconds of overlap with `[from, to)`.
    pub fn overlap_seconds(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Seconds {
        let start = self.start.max(from);
        let end = self.end.min(to);
        if start < end {
            (end - start).num_seconds()
        } else {
            0
        }
    }
}

/// The concrete session of one trading date.
///
/// `close` is the reported closing instant.  A close of `23:59:59` means the
/// session runs through the end of the day, so [`end`](Self::end), the
/// exclusive end used for membership and durations, is one second later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingWindow {
    /// The trading date this session is attributed to.
    pub trading_date: NaiveDate,
    /// Opening instant.
    pub open: DateTime<Utc>,
    /// Closing instant as published.
    pub close: DateTime<Utc>,
    /// Intraday breaks, ordered and clipped to the session.
    pub breaks: Vec<Interval>,
    end: DateTime<Utc>,
}

impl TradingWindow {
    pub(crate) fn new(
        trading_date: NaiveDate,
        open: DateTime<Utc>,
        close: DateTime<Utc>,
        end: DateTime<Utc>,
        breaks: Vec<Interval>,
    ) -> Self {
        Self {
            trading_date,
            open,
            close,
            breaks,
            end,
        }
    }

    /// Exclusive end of the session.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The whole session, breaks included.
    pub fn session(&self) -> Interval {
        Interval::new(self.open, self.end)
    }

    /// Return `true` if `instant` lies within the session, breaks included.
    pub fn in_session(&self, instant: DateTime<Utc>) -> bool {
        self.session().contains(instant)
    }

    /// Return `true` if the exchange is open at `instant`: inside the session
    /// and outside every break.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.in_session(instant) && !self.breaks.iter().any(|b| b.contains(instant))
    }

    /// The open stretches of the session, i.e. the session minus its breaks.
    pub fn segments(&self) -> Vec<Interval> {
        let mut segments = Vec::with_capacity(self.breaks.len() + 1);
        let mut cursor = self.open;
        for b in &self.breaks {
            if b.start > cursor {
                segments.push(Interval::new(cursor, b.start));
            }
            cursor = cursor.max(b.end);
        }
        if cursor < self.end {
            segments.push(Interval::new(cursor, self.end));
        }
        segments
    }

    /// Seconds of trading in the session.
    pub fn open_seconds(&self) -> Seconds {
        self.segments().iter().map(Interval::seconds).sum()
    }

    /// Seconds of trading in the session that fall within `[from, to)`.
    pub fn open_seconds_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Seconds {
        self.segments()
            .iter()
            .map(|s| s.overlap_seconds(from, to))
            .sum()
    }
}

/// One periodic-rule adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Adjustment {
    /// The replacement time, composed onto the date.
    pub time: DateTime<Utc>,
    /// Label of the rule that produced it, e.g. `"Fridays (DST)"`.
    pub rule: String,
}

/// Periodic-rule deviations in effect on a date, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AdjustmentDescriptor(BTreeMap<HoursField, Adjustment>);

impl AdjustmentDescriptor {
    pub(crate) fn insert(&mut self, field: HoursField, adjustment: Adjustment) {
        self.0.insert(field, adjustment);
    }

    /// The adjustment for `field`, if any.
    pub fn get(&self, field: HoursField) -> Option<&Adjustment> {
        self.0.get(&field)
    }

    /// The `daily_open` adjustment, if any.
    pub fn daily_open(&self) -> Option<&Adjustment> {
        self.get(HoursField::DailyOpen)
    }

    /// The `daily_close` adjustment, if any.
    pub fn daily_close(&self) -> Option<&Adjustment> {
        self.get(HoursField::DailyClose)
    }

    /// Return `true` when no periodic rule applies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of adjusted fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, adjustment)` pairs, `daily_open` first.
    pub fn iter(&self) -> impl Iterator<Item = (HoursField, &Adjustment)> + '_ {
        self.0.iter().map(|(f, a)| (*f, a))
    }
}

//! Calendar override table: date-keyed holidays, early closes, and late
//! opens, each scoped by a set of tags (exchange symbols, market
//! categories, country or currency codes).
//!
//! A table is one calendar snapshot: filled once by the loader, then only
//! read.  Holidays beat partial-day records on the same date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::exchange::Exchange;

/// Set of scope tags.
pub type ScopeTags = BTreeSet<String>;

/// Date-indexed override records for one calendar snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarOverrides {
    holidays: BTreeMap<NaiveDate, BTreeMap<String, ScopeTags>>,
    early_closes: BTreeMap<NaiveDate, BTreeMap<NaiveTime, ScopeTags>>,
    late_opens: BTreeMap<NaiveDate, BTreeMap<NaiveTime, ScopeTags>>,
}

fn tag_set<I, S>(scopes: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    scopes.into_iter().map(Into::into)
}

fn tag_matches(tags: &ScopeTags, scope: &str) -> bool {
    tags.iter().any(|t| t.eq_ignore_ascii_case(scope))
}

impl CalendarOverrides {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Record holiday `name` on `date` for `scopes`.  Repeated calls for the
    /// same date and name merge their scopes.
    pub fn add_holiday<I, S>(&mut self, date: NaiveDate, name: impl Into<String>, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.holidays
            .entry(date)
            .or_default()
            .entry(name.into())
            .or_default()
            .extend(tag_set(scopes));
    }

    /// Record an early close at `time` on `date` for `scopes`.
    pub fn add_early_close<I, S>(&mut self, date: NaiveDate, time: NaiveTime, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.early_closes
            .entry(date)
            .or_default()
            .entry(time)
            .or_default()
            .extend(tag_set(scopes));
    }

    /// Record a late open at `time` on `date` for `scopes`.
    pub fn add_late_open<I, S>(&mut self, date: NaiveDate, time: NaiveTime, scopes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.late_opens
            .entry(date)
            .or_default()
            .entry(time)
            .or_default()
            .extend(tag_set(scopes));
    }

    // ── Scope-tag lookups ────────────────────────────────────────────────────

    /// Name of the holiday on `date` for a scope tag, if any.  When several
    /// holidays match, the alphabetically first name is returned.
    pub fn holiday_for(&self, scope: &str, date: NaiveDate) -> Option<&str> {
        self.holidays
            .get(&date)?
            .iter()
            .find(|(_, tags)| tag_matches(tags, scope))
            .map(|(name, _)| name.as_str())
    }

    /// Every `(date, holiday name)` for `scope` in `[from, to]`.
    pub fn holidays_between(
        &self,
        scope: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<(NaiveDate, &str)> {
        if from > to {
            return Vec::new();
        }
        self.holidays
            .range(from..=to)
            .flat_map(|(date, names)| {
                names
                    .iter()
                    .filter(move |(_, tags)| tag_matches(tags, scope))
                    .map(move |(name, _)| (*date, name.as_str()))
            })
            .collect()
    }

    /// Earliest early close on `date` for a scope tag.
    pub fn early_close_for(&self, scope: &str, date: NaiveDate) -> Option<NaiveTime> {
        self.early_closes
            .get(&date)?
            .iter()
            .find(|(_, tags)| tag_matches(tags, scope))
            .map(|(time, _)| *time)
    }

    /// Latest late open on `date` for a scope tag.
    pub fn late_open_for(&self, scope: &str, date: NaiveDate) -> Option<NaiveTime> {
        self.late_opens
            .get(&date)?
            .iter()
            .rev()
            .find(|(_, tags)| tag_matches(tags, scope))
            .map(|(time, _)| *time)
    }

    // ── Exchange lookups ─────────────────────────────────────────────────────

    /// Name of the holiday on `date` that applies to `exchange` through any
    /// of its scope tags.
    pub fn holiday_for_exchange(&self, exchange: &Exchange, date: NaiveDate) -> Option<&str> {
        self.holidays
            .get(&date)?
            .iter()
            .find(|(_, tags)| exchange.in_scope(tags.iter()))
            .map(|(name, _)| name.as_str())
    }

    /// Earliest early close on `date` applying to `exchange`.  `None` on a
    /// holiday for that exchange.
    pub fn early_close_for_exchange(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Option<NaiveTime> {
        let time = self
            .early_closes
            .get(&date)?
            .iter()
            .find(|(_, tags)| exchange.in_scope(tags.iter()))
            .map(|(time, _)| *time)?;
        self.unless_holiday(exchange, date, time, "early close")
    }

    /// Latest late open on `date` applying to `exchange`.  `None` on a
    /// holiday for that exchange.
    pub fn late_open_for_exchange(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
    ) -> Option<NaiveTime> {
        let time = self
            .late_opens
            .get(&date)?
            .iter()
            .rev()
            .find(|(_, tags)| exchange.in_scope(tags.iter()))
            .map(|(time, _)| *time)?;
        self.unless_holiday(exchange, date, time, "late open")
    }

    fn unless_holiday(
        &self,
        exchange: &Exchange,
        date: NaiveDate,
        time: NaiveTime,
        kind: &str,
    ) -> Option<NaiveTime> {
        match self.holiday_for_exchange(exchange, date) {
            Some(holiday) => {
                debug!(
                    symbol = exchange.symbol(),
                    %date,
                    holiday,
                    kind,
                    "holiday overrides partial-day record"
                );
                None
            }
            None => Some(time),
        }
    }

    // ── Introspection ────────────────────────────────────────────────────────

    /// Number of dates carrying at least one holiday.
    pub fn holiday_date_count(&self) -> usize {
        self.holidays.len()
    }

    /// Number of dates carrying early closes.
    pub fn early_close_date_count(&self) -> usize {
        self.early_closes.len()
    }

    /// Number of dates carrying late opens.
    pub fn late_open_date_count(&self) -> usize {
        self.late_opens.len()
    }

    /// Return `true` if the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty() && self.early_closes.is_empty() && self.late_opens.is_empty()
    }
}

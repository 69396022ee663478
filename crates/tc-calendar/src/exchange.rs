//! `Exchange`: a venue's identity, scope tags, time zones, and schedule.

use chrono_tz::Tz;
use tc_core::errors::{Error, Result};

use crate::schedule::ExchangeSchedule;

/// A tradable venue or instrument group.
///
/// The schedule's hour tables are wall-clock times in
/// [`hours_zone`](Self::hours_zone) (UTC unless set otherwise); calendar
/// dates handed to the engine are dates in that zone.  The
/// [`time_zone`](Self::time_zone) only decides which DST variant applies.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    symbol: String,
    category: Option<String>,
    countries: Vec<String>,
    time_zone: Tz,
    hours_zone: Tz,
    schedule: ExchangeSchedule,
}

impl Exchange {
    /// Create an exchange whose hours are written in UTC.
    pub fn new(symbol: impl Into<String>, time_zone: Tz, schedule: ExchangeSchedule) -> Self {
        Self {
            symbol: symbol.into(),
            category: None,
            countries: Vec::new(),
            time_zone,
            hours_zone: Tz::UTC,
            schedule,
        }
    }

    /// Set the market category (e.g. `"forex"`, `"metals"`).
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a country or currency code the exchange belongs to.
    pub fn with_country(mut self, code: impl Into<String>) -> Self {
        self.countries.push(code.into());
        self
    }

    /// Replace the governing zone.
    pub fn with_time_zone(mut self, zone: Tz) -> Self {
        self.time_zone = zone;
        self
    }

    /// Set the zone the hour tables are written in.
    pub fn with_hours_zone(mut self, zone: Tz) -> Self {
        self.hours_zone = zone;
        self
    }

    /// Exchange symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Market category, if declared.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Country / currency codes.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Governing zone for the DST flag.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Zone the hour tables and trading dates are expressed in.
    pub fn hours_zone(&self) -> Tz {
        self.hours_zone
    }

    /// The weekly schedule.
    pub fn schedule(&self) -> &ExchangeSchedule {
        &self.schedule
    }

    /// Every scope tag identifying this exchange: its symbol, its category,
    /// and its country codes.
    pub fn scope_tags(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.symbol.as_str())
            .chain(self.category.as_deref())
            .chain(self.countries.iter().map(String::as_str))
    }

    /// Return `true` if any of `tags` names this exchange (ASCII
    /// case-insensitive).
    pub fn in_scope<'t, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'t String>,
    {
        tags.into_iter()
            .any(|tag| self.scope_tags().any(|own| own.eq_ignore_ascii_case(tag)))
    }
}

/// Parse an IANA zone name.
///
/// An unknown zone is a configuration error.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| Error::Configuration(format!("unresolvable time zone '{name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DaySession;
    use crate::weekday::WeekdaySet;
    use std::collections::BTreeSet;

    fn sample() -> Exchange {
        let schedule = ExchangeSchedule::builder()
            .trading_days(WeekdaySet::SUNDAY_TO_FRIDAY)
            .daily_hours(DaySession::full_day())
            .build()
            .unwrap();
        Exchange::new("EURUSD", chrono_tz::America::New_York, schedule)
            .with_category("forex")
            .with_country("EUR")
            .with_country("USD")
    }

    #[test]
    fn scope_tags_in_order() {
        let ex = sample();
        assert_eq!(ex.scope_tags().collect::<Vec<_>>(), vec!["EURUSD", "forex", "EUR", "USD"]);
        assert_eq!(ex.hours_zone(), Tz::UTC);
    }

    #[test]
    fn scope_matching() {
        let ex = sample();
        let tags: BTreeSet<String> = ["usd".to_string()].into_iter().collect();
        assert!(ex.in_scope(&tags));
        let tags: BTreeSet<String> = ["JPY".to_string(), "metals".to_string()]
            .into_iter()
            .collect();
        assert!(!ex.in_scope(&tags));
    }

    #[test]
    fn zone_parsing() {
        assert_eq!(parse_zone("America/New_York").unwrap(), chrono_tz::America::New_York);
        let err = parse_zone("Mars/Olympus_Mons").unwrap_err();
        assert!(err.is_configuration());
    }
}

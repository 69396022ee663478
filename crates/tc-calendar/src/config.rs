//! TOML calendar configuration.
//!
//! One document describes the engine settings, any number of exchanges, and
//! one override snapshot:
//!
//! ```toml
//! [settings]
//! max_scan_days = 400
//! dst_reference = "utc_midnight"
//!
//! [[exchanges]]
//! symbol = "EURUSD"
//! preset = "forex"
//! countries = ["EU", "US"]
//!
//! [[exchanges]]
//! symbol = "XTKS"
//! category = "equities"
//! time_zone = "Asia/Tokyo"
//! hours_zone = "Asia/Tokyo"
//! trading_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
//! hours = [{ open = "09:00", close = "15:30" }]
//! breaks = [{ start = "11:30", end = "12:30" }]
//!
//! [[holidays]]
//! date = "2024-12-25"
//! name = "Christmas Day"
//! scopes = ["US", "EU"]
//!
//! [[early_closes]]
//! date = "2024-12-24"
//! time = "18:00:00"
//! scopes = ["forex"]
//! ```
//!
//! Every parse or validation failure is reported as
//! [`Error::Configuration`].

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tc_core::errors::{Error, Result};
use tc_core::settings::EngineSettings;
use tracing::{debug, info};

use crate::clock::parse_hms;
use crate::dst::DstVariant;
use crate::exchange::{parse_zone, Exchange};
use crate::exchanges;
use crate::overrides::CalendarOverrides;
use crate::provider::ExchangeRegistry;
use crate::schedule::{AdjustmentRule, DaySession, ExchangeSchedule, HoursField};
use crate::weekday::{Weekday, WeekdaySet};

/// A loaded configuration document.
#[derive(Debug, Clone, Default)]
pub struct CalendarConfig {
    /// Engine settings from `[settings]`, defaults if absent.
    pub settings: EngineSettings,
    /// Every `[[exchanges]]` entry.
    pub exchanges: ExchangeRegistry,
    /// The `[[holidays]]`, `[[early_closes]]` and `[[late_opens]]` tables.
    pub overrides: CalendarOverrides,
}

// ── Raw document ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    settings: EngineSettings,
    #[serde(default)]
    exchanges: Vec<RawExchange>,
    #[serde(default)]
    holidays: Vec<RawHoliday>,
    #[serde(default)]
    early_closes: Vec<RawPartialDay>,
    #[serde(default)]
    late_opens: Vec<RawPartialDay>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Preset {
    Forex,
    Metals,
    Crypto,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExchange {
    symbol: String,
    preset: Option<Preset>,
    category: Option<String>,
    #[serde(default)]
    countries: Vec<String>,
    time_zone: Option<String>,
    hours_zone: Option<String>,
    #[serde(default)]
    trading_days: Vec<String>,
    #[serde(default)]
    hours: Vec<RawHours>,
    #[serde(default)]
    breaks: Vec<RawBreak>,
    #[serde(default)]
    adjustments: Vec<RawAdjustment>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHours {
    /// Empty means every trading day.
    #[serde(default)]
    days: Vec<String>,
    /// Absent means both variants.
    variant: Option<DstVariant>,
    open: String,
    close: String,
    #[serde(default)]
    opens_previous_day: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBreak {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAdjustment {
    weekday: String,
    variant: DstVariant,
    field: HoursField,
    time: String,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHoliday {
    date: String,
    name: String,
    scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPartialDay {
    date: String,
    time: String,
    scopes: Vec<String>,
}

// ── Conversion ───────────────────────────────────────────────────────────────

fn config_err(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Configuration(format!("{context}: {err}"))
}

fn parse_date(s: &str, context: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| config_err(context, format!("date '{s}': {e}")))
}

fn parse_time(s: &str, context: &str) -> Result<chrono::NaiveTime> {
    parse_hms(s).map_err(|e| config_err(context, e))
}

fn parse_weekday(s: &str, context: &str) -> Result<Weekday> {
    s.parse().map_err(|e| config_err(context, e))
}

impl RawExchange {
    fn into_exchange(self) -> Result<Exchange> {
        let ctx = format!("exchange {}", self.symbol);
        let zone = self
            .time_zone
            .as_deref()
            .map(parse_zone)
            .transpose()
            .map_err(|e| config_err(&ctx, e))?;
        let mut exchange = match self.preset {
            Some(preset) => {
                if !self.hours.is_empty()
                    || !self.breaks.is_empty()
                    || !self.adjustments.is_empty()
                    || !self.trading_days.is_empty()
                {
                    return Err(config_err(&ctx, "a preset cannot be combined with explicit hours"));
                }
                let built = match preset {
                    Preset::Forex => exchanges::forex(&self.symbol),
                    Preset::Metals => exchanges::metals(&self.symbol),
                    Preset::Crypto => exchanges::crypto(&self.symbol),
                }
                .map_err(|e| config_err(&ctx, e))?;
                match zone {
                    Some(zone) => built.with_time_zone(zone),
                    None => built,
                }
            }
            None => {
                let zone = zone.ok_or_else(|| config_err(&ctx, "missing time_zone"))?;
                let schedule = build_schedule(
                    &ctx,
                    &self.trading_days,
                    &self.hours,
                    &self.breaks,
                    &self.adjustments,
                )?;
                Exchange::new(self.symbol.clone(), zone, schedule)
            }
        };

        if let Some(category) = self.category {
            exchange = exchange.with_category(category);
        }
        if let Some(name) = self.hours_zone.as_deref() {
            exchange = exchange.with_hours_zone(parse_zone(name).map_err(|e| config_err(&ctx, e))?);
        }
        for code in self.countries {
            exchange = exchange.with_country(code);
        }
        Ok(exchange)
    }
}

fn build_schedule(
    ctx: &str,
    trading_days: &[String],
    hours: &[RawHours],
    breaks: &[RawBreak],
    adjustments: &[RawAdjustment],
) -> Result<ExchangeSchedule> {
    let days: WeekdaySet = trading_days
        .iter()
        .map(|d| parse_weekday(d, ctx))
        .collect::<Result<_>>()?;

    let mut builder = ExchangeSchedule::builder().trading_days(days);
    for entry in hours {
        let open = parse_time(&entry.open, ctx)?;
        let close = parse_time(&entry.close, ctx)?;
        let session = if entry.opens_previous_day {
            DaySession::overnight(open, close)
        } else {
            DaySession::new(open, close)
        };
        let targets: Vec<Weekday> = if entry.days.is_empty() {
            days.iter().collect()
        } else {
            entry
                .days
                .iter()
                .map(|d| parse_weekday(d, ctx))
                .collect::<Result<_>>()?
        };
        let variants = match entry.variant {
            Some(v) => vec![v],
            None => DstVariant::BOTH.to_vec(),
        };
        for day in targets {
            for &variant in &variants {
                builder = builder.hours(day, variant, session);
            }
        }
    }
    for b in breaks {
        builder = builder.trading_break(parse_time(&b.start, ctx)?, parse_time(&b.end, ctx)?);
    }
    for a in adjustments {
        let weekday = parse_weekday(&a.weekday, ctx)?;
        let time = parse_time(&a.time, ctx)?;
        let rule = match &a.label {
            Some(label) => AdjustmentRule::new(weekday, a.variant, a.field, time, label.clone()),
            None => AdjustmentRule::labelled(weekday, a.variant, a.field, time),
        };
        builder = builder.adjustment(rule);
    }
    builder.build().map_err(|e| config_err(ctx, e))
}

impl CalendarConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    /// [`Error::Configuration`] on malformed TOML, unknown keys, unknown
    /// zones, unparsable dates or times, or a schedule that fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawDocument =
            toml::from_str(text).map_err(|e| config_err("invalid calendar document", e))?;

        let mut exchanges = ExchangeRegistry::new();
        for entry in raw.exchanges {
            let exchange = entry.into_exchange()?;
            debug!(symbol = exchange.symbol(), "loaded exchange");
            if let Some(previous) = exchanges.insert(exchange) {
                return Err(config_err("duplicate exchange", previous.symbol()));
            }
        }

        let mut overrides = CalendarOverrides::new();
        for h in raw.holidays {
            let date = parse_date(&h.date, &format!("holiday {}", h.name))?;
            overrides.add_holiday(date, h.name, h.scopes);
        }
        for r in raw.early_closes {
            let date = parse_date(&r.date, "early close")?;
            overrides.add_early_close(date, parse_time(&r.time, "early close")?, r.scopes);
        }
        for r in raw.late_opens {
            let date = parse_date(&r.date, "late open")?;
            overrides.add_late_open(date, parse_time(&r.time, "late open")?, r.scopes);
        }

        info!(
            exchanges = exchanges.len(),
            holiday_dates = overrides.holiday_date_count(),
            early_close_dates = overrides.early_close_date_count(),
            late_open_dates = overrides.late_open_date_count(),
            max_scan_days = raw.settings.max_scan_days,
            "calendar configuration loaded"
        );
        Ok(Self {
            settings: raw.settings,
            exchanges,
            overrides,
        })
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// [`Error::Configuration`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| config_err(&path.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ExchangeProvider;
    use tc_core::settings::DstReference;

    #[test]
    fn empty_document() {
        let cfg = CalendarConfig::from_toml_str("").unwrap();
        assert!(cfg.exchanges.is_empty());
        assert!(cfg.overrides.is_empty());
        assert_eq!(cfg.settings, EngineSettings::default());
    }

    #[test]
    fn preset_with_extra_tags() {
        let cfg = CalendarConfig::from_toml_str(
            r#"
            [settings]
            dst_reference = "local_midnight"

            [[exchanges]]
            symbol = "EURUSD"
            preset = "forex"
            countries = ["EU", "US"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.settings.dst_reference, DstReference::LocalMidnight);
        let ex = cfg.exchanges.exchange("eurusd").unwrap();
        assert_eq!(ex.category(), Some("forex"));
        assert_eq!(ex.countries(), ["EU".to_string(), "US".to_string()]);
        assert_eq!(ex.schedule().adjustment_rules().len(), 2);
    }

    #[test]
    fn explicit_schedule() {
        let cfg = CalendarConfig::from_toml_str(
            r#"
            [[exchanges]]
            symbol = "XTKS"
            time_zone = "Asia/Tokyo"
            hours_zone = "Asia/Tokyo"
            trading_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
            hours = [{ open = "09:00", close = "15:30" }]
            breaks = [{ start = "11:30", end = "12:30" }]

            [[holidays]]
            date = "2024-01-01"
            name = "New Year's Day"
            scopes = ["XTKS"]
            "#,
        )
        .unwrap();
        let ex = cfg.exchanges.exchange("XTKS").unwrap();
        assert_eq!(ex.hours_zone(), chrono_tz::Asia::Tokyo);
        assert_eq!(ex.schedule().breaks().len(), 1);
        assert_eq!(
            cfg.overrides.holiday_for("XTKS", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            Some("New Year's Day")
        );
    }

    #[test]
    fn failures_are_configuration_errors() {
        for doc in [
            r#"
            [[exchanges]]
            symbol = "X"
            time_zone = "Mars/Olympus"
            trading_days = ["Mon"]
            hours = [{ open = "09:00", close = "17:00" }]
            "#,
            r#"
            [[exchanges]]
            symbol = "X"
            time_zone = "UTC"
            trading_days = ["Mon", "Tue"]
            hours = [{ days = ["Mon"], open = "09:00", close = "17:00" }]
            "#,
            r#"
            [[holidays]]
            date = "2024-13-01"
            name = "Bad"
            scopes = ["US"]
            "#,
            r#"
            [[early_closes]]
            date = "2024-12-24"
            time = "25:00"
            scopes = ["US"]
            "#,
            r#"
            [[exchanges]]
            symbol = "X"
            preset = "forex"
            hours = [{ open = "09:00", close = "17:00" }]
            "#,
            "unknown = 1",
            r#"
            [[exchanges]]
            symbol = "X"
            preset = "crypto"
            [[exchanges]]
            symbol = "x"
            preset = "crypto"
            "#,
        ] {
            let err = CalendarConfig::from_toml_str(doc).unwrap_err();
            assert!(err.is_configuration(), "{doc}: {err}");
        }
    }

    #[test]
    fn preset_rejects_explicit_breaks() {
        let err = CalendarConfig::from_toml_str(
            r#"
            [[exchanges]]
            symbol = "X"
            preset = "forex"
            breaks = [{ start = "12:00", end = "13:00" }]
            "#,
        )
        .unwrap_err();
        assert!(err.is_configuration(), "{err}");
        assert!(err.to_string().contains("preset"), "{err}");
    }
}

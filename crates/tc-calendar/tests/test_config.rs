//! Loading a calendar document and querying it through the provider traits.

use chrono::{NaiveDate, TimeZone, Utc};
use tc_calendar::{
    CalendarConfig, CalendarOverrides, ExchangeProvider, SnapshotStore, TradingCalendar,
};
use tc_core::{DstReference, Error};

const DOCUMENT: &str = r#"
[settings]
max_scan_days = 30

[[exchanges]]
symbol = "EURUSD"
preset = "forex"
countries = ["EU", "US"]

[[exchanges]]
symbol = "XAUUSD"
preset = "metals"

[[exchanges]]
symbol = "XTKS"
category = "equities"
countries = ["JP"]
time_zone = "Asia/Tokyo"
hours_zone = "Asia/Tokyo"
trading_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
hours = [{ open = "09:00", close = "15:30" }]
breaks = [{ start = "11:30", end = "12:30" }]

[[exchanges]]
symbol = "SYD"
time_zone = "Australia/Sydney"
trading_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
hours = [
    { variant = "standard", open = "00:00", close = "06:00" },
    { variant = "dst", open = "23:00", close = "05:00", opens_previous_day = true },
]

[[exchanges.adjustments]]
weekday = "Friday"
variant = "standard"
field = "daily_close"
time = "04:00"

[[holidays]]
date = "2024-12-25"
name = "Christmas Day"
scopes = ["US", "metals"]

[[holidays]]
date = "2024-01-01"
name = "New Year's Day"
scopes = ["JP"]

[[early_closes]]
date = "2024-12-24"
time = "18:00:00"
scopes = ["EURUSD"]

[[late_opens]]
date = "2024-01-04"
time = "10:30"
scopes = ["XTKS"]
"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn document_loads() {
    let cfg = CalendarConfig::from_toml_str(DOCUMENT).unwrap();
    assert_eq!(cfg.settings.max_scan_days, 30);
    assert_eq!(cfg.settings.dst_reference, DstReference::UtcMidnight);
    assert_eq!(cfg.exchanges.len(), 4);
    assert_eq!(cfg.overrides.holiday_date_count(), 2);
    assert_eq!(cfg.overrides.early_close_date_count(), 1);
    assert_eq!(cfg.overrides.late_open_date_count(), 1);
    let syd = cfg.exchanges.require("syd").unwrap();
    assert_eq!(syd.schedule().adjustment_rules()[0].label, "Fridays");
}

#[test]
fn engine_over_loaded_snapshot() {
    let cfg = CalendarConfig::from_toml_str(DOCUMENT).unwrap();
    let store = SnapshotStore::with_current("2024", cfg.overrides.clone());
    let engine = TradingCalendar::from_provider(&store, None, cfg.settings).unwrap();
    assert_eq!(engine.settings().max_scan_days, 30);

    let eurusd = cfg.exchanges.require("EURUSD").unwrap();
    let xauusd = cfg.exchanges.require("XAUUSD").unwrap();
    let xtks = cfg.exchanges.require("XTKS").unwrap();

    // Holiday scoped by country reaches the forex pair, by category the metal.
    assert!(!engine.trades_on(eurusd, date(2024, 12, 25)).unwrap());
    assert!(!engine.trades_on(xauusd, date(2024, 12, 25)).unwrap());
    assert!(engine.trades_on(xtks, date(2024, 12, 25)).unwrap());
    assert_eq!(
        engine.closing_on(eurusd, date(2024, 12, 24)).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap())
    );

    // Tokyo hours are local wall-clock times.
    let window = engine.trading_window(xtks, date(2024, 1, 5)).unwrap().unwrap();
    assert_eq!(window.open, Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
    assert_eq!(window.close, Utc.with_ymd_and_hms(2024, 1, 5, 6, 30, 0).unwrap());
    assert_eq!(window.open_seconds(), 5 * 3600 + 30 * 60);
    assert!(!engine.trades_on(xtks, date(2024, 1, 1)).unwrap());
    assert!(engine.opens_late_on(xtks, date(2024, 1, 4)).unwrap());
    // The 10:30 late open precedes the 11:30 break, which stays whole.
    assert_eq!(
        engine.trading_breaks(xtks, date(2024, 1, 4)).unwrap()[0].start,
        Utc.with_ymd_and_hms(2024, 1, 4, 2, 30, 0).unwrap()
    );
    assert_eq!(
        engine.next_open_at(xtks, Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap()).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 1, 4, 1, 30, 0).unwrap())
    );
}

#[test]
fn variant_specific_sessions() {
    let cfg = CalendarConfig::from_toml_str(DOCUMENT).unwrap();
    let engine = TradingCalendar::with_settings(&cfg.overrides, cfg.settings);
    let syd = cfg.exchanges.require("SYD").unwrap();

    // January is summer time in Sydney: the session opens the evening before.
    assert_eq!(
        engine.opening_on(syd, date(2024, 1, 8)).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 1, 7, 23, 0, 0).unwrap())
    );
    assert_eq!(
        engine.trading_date_for(syd, Utc.with_ymd_and_hms(2024, 1, 7, 23, 30, 0).unwrap()).unwrap(),
        date(2024, 1, 8)
    );
    // July is standard time, with the standard-time Friday rule.
    assert_eq!(
        engine.opening_on(syd, date(2024, 7, 8)).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 7, 8, 0, 0, 0).unwrap())
    );
    assert_eq!(
        engine.closing_on(syd, date(2024, 7, 12)).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 7, 12, 4, 0, 0).unwrap())
    );
    assert_eq!(
        engine.closing_on(syd, date(2024, 1, 12)).unwrap(),
        Some(Utc.with_ymd_and_hms(2024, 1, 12, 5, 0, 0).unwrap())
    );
}

#[test]
fn snapshots_are_independent() {
    let cfg = CalendarConfig::from_toml_str(DOCUMENT).unwrap();
    let mut what_if = cfg.overrides.clone();
    what_if.add_holiday(date(2024, 12, 27), "Extra", ["forex"]);

    let mut store = SnapshotStore::with_current("published", cfg.overrides.clone());
    store.insert("what-if", what_if);

    let eurusd = cfg.exchanges.require("EURUSD").unwrap();
    let published = TradingCalendar::from_provider(&store, None, cfg.settings).unwrap();
    let hypothetical =
        TradingCalendar::from_provider(&store, Some("what-if"), cfg.settings).unwrap();
    assert!(published.trades_on(eurusd, date(2024, 12, 27)).unwrap());
    assert!(!hypothetical.trades_on(eurusd, date(2024, 12, 27)).unwrap());

    let err = TradingCalendar::from_provider(&store, Some("missing"), cfg.settings).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn missing_weekday_hours_is_fatal() {
    let err = CalendarConfig::from_toml_str(
        r#"
        [[exchanges]]
        symbol = "BAD"
        time_zone = "America/New_York"
        trading_days = ["Mon", "Sun"]
        hours = [{ days = ["Mon"], open = "09:30", close = "16:00" }]
        "#,
    )
    .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Sunday"), "{err}");
}

#[test]
fn from_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("tradeclock-config-{}.toml", std::process::id()));
    std::fs::write(&path, DOCUMENT).unwrap();
    let cfg = CalendarConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(cfg.exchanges.len(), 4);

    let err = CalendarConfig::from_file(&path).unwrap_err();
    assert!(err.is_configuration());
    assert!(CalendarOverrides::new().is_empty());
}

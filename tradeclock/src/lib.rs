//! # tradeclock
//!
//! Answers, for an exchange and a date or instant, whether trading is
//! happening and exactly when it starts and stops: holidays, early closes,
//! late opens, daylight-saving shifts, and 24/7 venues included.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//! Application code should depend on it rather than on the individual
//! `tc-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! tradeclock = "0.1"
//! ```
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tradeclock::calendar::{exchanges, CalendarOverrides, TradingCalendar};
//!
//! let metals = exchanges::metals("M").unwrap();
//! let overrides = CalendarOverrides::new();
//! let engine = TradingCalendar::new(&overrides);
//!
//! let friday = NaiveDate::from_ymd_opt(2024, 2, 9).unwrap();
//! let close = engine.closing_on(&metals, friday).unwrap().unwrap();
//! assert_eq!(close.format("%H:%M:%S").to_string(), "20:45:00");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Error types and engine settings.
pub use tc_core as core;

/// Exchange schedules, calendar overrides, and the resolution engine.
pub use tc_calendar as calendar;

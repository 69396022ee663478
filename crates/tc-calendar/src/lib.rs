//! # tc-calendar
//!
//! Exchange schedules, calendar overrides, the DST oracle, and the
//! trading-calendar resolution engine.
//!
//! ```
//! use chrono::NaiveDate;
//! use tc_calendar::{exchanges, CalendarOverrides, TradingCalendar};
//!
//! let eurusd = exchanges::forex("EURUSD").unwrap();
//! let overrides = CalendarOverrides::new();
//! let engine = TradingCalendar::new(&overrides);
//!
//! let saturday = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
//! assert!(!engine.trades_on(&eurusd, saturday).unwrap());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Time-of-day parsing and local/UTC composition.
pub mod clock;

/// TOML configuration loader.
pub mod config;

/// DST oracle and hour-table variants.
pub mod dst;

/// The resolution engine.
pub mod engine;

/// `Exchange` identity and zones.
pub mod exchange;

/// Built-in reference exchanges.
pub mod exchanges;

/// Date-keyed holidays, early closes, and late opens.
pub mod overrides;

/// Exchange and calendar-snapshot providers.
pub mod provider;

/// Open/close precedence chain.
pub mod rules;

/// Weekly schedule, breaks, and periodic adjustment rules.
pub mod schedule;

/// `Weekday` and `WeekdaySet`.
pub mod weekday;

/// Trading windows and adjustment descriptors.
pub mod window;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use config::CalendarConfig;
pub use dst::{DstOracle, DstVariant};
pub use engine::TradingCalendar;
pub use exchange::Exchange;
pub use overrides::CalendarOverrides;
pub use provider::{CalendarProvider, ExchangeProvider, ExchangeRegistry, SnapshotStore};
pub use rules::{HoursSource, Resolution, RuleOrigin};
pub use schedule::{
    AdjustmentRule, DaySession, ExchangeSchedule, ExchangeScheduleBuilder, HoursField, TradingBreak,
};
pub use weekday::{Weekday, WeekdaySet};
pub use window::{Adjustment, AdjustmentDescriptor, Interval, TradingWindow};

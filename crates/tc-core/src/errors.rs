//! Error types for tradeclock.
//!
//! Every failure the resolution engine can report is a variant of the single
//! `thiserror`-derived [`Error`] enum.  A holiday with no opening time is *not*
//! an error; operations express that as `Ok(None)`.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// The top-level error type used throughout tradeclock.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Bad static exchange or calendar data (missing weekday hours,
    /// unresolvable time zone, malformed hours).  Not recoverable per call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An instant is claimed by more than one trading session.
    #[error("cannot attribute {instant} to a single trading date for {symbol}")]
    AmbiguousTradingDate {
        /// Exchange symbol.
        symbol: String,
        /// The instant that could not be attributed.
        instant: DateTime<Utc>,
    },

    /// A bounded forward/backward scan ran out of calendar days.
    #[error("no match for {symbol} within {limit} days of {from}")]
    ScanLimitExceeded {
        /// Exchange symbol.
        symbol: String,
        /// Date the scan started from.
        from: NaiveDate,
        /// The configured ceiling, in calendar days.
        limit: u32,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A textual value (time-of-day, weekday, zone name) could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Return `true` for errors that indicate bad static data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Shorthand `Result` type used throughout tradeclock.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use tc_core::{ensure, errors::Error};
/// fn positive(x: i64) -> tc_core::errors::Result<i64> {
///     ensure!(x > 0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1).is_ok());
/// assert!(matches!(positive(-1), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}

/// Return `Err(Error::Configuration(...))` immediately.
///
/// # Example
/// ```
/// use tc_core::{fail, errors::Error};
/// fn always_err() -> tc_core::errors::Result<()> {
///     fail!("no hours for {}", "Monday");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Configuration(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(open: u32, close: u32) -> Result<u32> {
        ensure!(open < close, "open {open} must precede close {close}");
        Ok(close - open)
    }

    #[test]
    fn ensure_maps_to_configuration() {
        assert_eq!(checked(1, 3), Ok(2));
        let err = checked(3, 1).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration error: open 3 must precede close 1"
        );
    }

    #[test]
    fn scan_limit_message() {
        let err = Error::ScanLimitExceeded {
            symbol: "EURUSD".into(),
            from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            limit: 10,
        };
        assert_eq!(err.to_string(), "no match for EURUSD within 10 days of 2024-01-01");
        assert!(!err.is_configuration());
    }
}

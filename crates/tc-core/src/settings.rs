//! Engine settings.
//!
//! [`EngineSettings`] is a plain value handed to each engine instance; there
//! is no process-wide settings object.  Two engines built over the same
//! calendar snapshot may run with different scan ceilings.

use serde::Deserialize;

/// Default ceiling, in calendar days, for bounded scans.
pub const DEFAULT_MAX_SCAN_DAYS: u32 = 366;

/// The canonical instant at which the DST flag for a trading date is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstReference {
    /// 00:00:00 UTC of the trading date.
    #[default]
    UtcMidnight,
    /// 00:00:00 of the trading date in the exchange's governing zone.
    LocalMidnight,
}

/// Settings shared by every query an engine answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum number of calendar days scanned by `trade_date_before`,
    /// `trade_date_after`, `next_open_at` and `next_close_at`.
    pub max_scan_days: u32,
    /// Where the DST flag is sampled for a given trading date.
    pub dst_reference: DstReference,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_scan_days: DEFAULT_MAX_SCAN_DAYS,
            dst_reference: DstReference::default(),
        }
    }
}

impl EngineSettings {
    /// Return a copy with a different scan ceiling.
    pub fn with_max_scan_days(mut self, days: u32) -> Self {
        self.max_scan_days = days;
        self
    }

    /// Return a copy with a different DST reference instant.
    pub fn with_dst_reference(mut self, reference: DstReference) -> Self {
        self.dst_reference = reference;
        self
    }
}

//! DST oracle.
//!
//! Decides whether an exchange's governing time zone observes daylight-saving
//! time at an instant, and therefore which variant of its hour tables applies
//! to a trading date.  The flag for a date is sampled at one canonical instant
//! chosen by [`DstReference`], so every query about the same date agrees.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use serde::Deserialize;
use tc_core::errors::Result;
use tc_core::settings::DstReference;

use crate::clock::{self, MIDNIGHT};

/// Standard-time or daylight-saving-time version of an hour table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstVariant {
    /// Standard time.
    Standard,
    /// Daylight-saving time.
    #[serde(alias = "dst")]
    Daylight,
}

impl DstVariant {
    /// Both variants, standard first.
    pub const BOTH: [DstVariant; 2] = [DstVariant::Standard, DstVariant::Daylight];

    /// Variant for a DST flag.
    pub fn from_flag(is_dst: bool) -> Self {
        if is_dst {
            DstVariant::Daylight
        } else {
            DstVariant::Standard
        }
    }

    /// Return `true` for [`DstVariant::Daylight`].
    pub fn is_dst(&self) -> bool {
        matches!(self, DstVariant::Daylight)
    }
}

impl std::fmt::Display for DstVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DstVariant::Standard => write!(f, "standard"),
            DstVariant::Daylight => write!(f, "DST"),
        }
    }
}

/// Return `true` if `zone` observes daylight-saving time at `instant`.
pub fn is_dst(zone: Tz, instant: DateTime<Utc>) -> bool {
    zone.offset_from_utc_datetime(&instant.naive_utc()).dst_offset() != Duration::zero()
}

/// Samples the DST flag for trading dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DstOracle {
    reference: DstReference,
}

impl DstOracle {
    /// Create an oracle sampling at `reference`.
    pub fn new(reference: DstReference) -> Self {
        Self { reference }
    }

    /// The sampling rule in use.
    pub fn reference(&self) -> DstReference {
        self.reference
    }

    /// The instant at which the flag for `date` is evaluated.
    pub fn reference_instant(&self, zone: Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
        match self.reference {
            DstReference::UtcMidnight => clock::compose(Tz::UTC, date, MIDNIGHT),
            DstReference::LocalMidnight => clock::compose(zone, date, MIDNIGHT),
        }
    }

    /// DST flag of `zone` for trading date `date`.
    pub fn is_dst_on(&self, zone: Tz, date: NaiveDate) -> Result<bool> {
        Ok(is_dst(zone, self.reference_instant(zone, date)?))
    }

    /// Hour-table variant of `zone` for trading date `date`.
    pub fn variant_on(&self, zone: Tz, date: NaiveDate) -> Result<DstVariant> {
        self.is_dst_on(zone, date).map(DstVariant::from_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::Asia::Tokyo;
    use chrono_tz::Australia::Sydney;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn winter_and_summer() {
        let winter = Utc.with_ymd_and_hms(2024, 2, 4, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 7, 12, 0, 0).unwrap();
        assert!(!is_dst(New_York, winter));
        assert!(is_dst(New_York, summer));
    }

    #[test]
    fn zone_without_dst() {
        let summer = Utc.with_ymd_and_hms(2024, 7, 7, 12, 0, 0).unwrap();
        assert!(!is_dst(Tokyo, summer));
        assert!(!is_dst(Tz::UTC, summer));
    }

    #[test]
    fn transition_instant() {
        // New York springs forward at 07:00 UTC on 2024-03-10
        let before = Utc.with_ymd_and_hms(2024, 3, 10, 6, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap();
        assert!(!is_dst(New_York, before));
        assert!(is_dst(New_York, after));
    }

    #[test]
    fn reference_instants_on_transition_day() {
        // The day after spring-forward: both references see DST.
        let oracle = DstOracle::new(DstReference::UtcMidnight);
        assert_eq!(oracle.variant_on(New_York, ymd(2024, 3, 11)).unwrap(), DstVariant::Daylight);
        // On the transition date itself both midnights precede 02:00 local.
        assert_eq!(oracle.variant_on(New_York, ymd(2024, 3, 10)).unwrap(), DstVariant::Standard);
        let local = DstOracle::new(DstReference::LocalMidnight);
        assert_eq!(local.variant_on(New_York, ymd(2024, 3, 10)).unwrap(), DstVariant::Standard);
    }

    #[test]
    fn fall_back_day() {
        // 2024-11-03: 00:00 UTC is 20:00 EDT on Nov 2; local midnight is
        // 04:00 UTC, still EDT.  Nov 4 is standard under both rules.
        let utc = DstOracle::new(DstReference::UtcMidnight);
        let local = DstOracle::new(DstReference::LocalMidnight);
        assert_eq!(utc.variant_on(New_York, ymd(2024, 11, 3)).unwrap(), DstVariant::Daylight);
        assert_eq!(local.variant_on(New_York, ymd(2024, 11, 3)).unwrap(), DstVariant::Daylight);
        assert_eq!(utc.variant_on(New_York, ymd(2024, 11, 4)).unwrap(), DstVariant::Standard);
        assert_eq!(local.variant_on(New_York, ymd(2024, 11, 4)).unwrap(), DstVariant::Standard);
    }

    #[test]
    fn references_disagree_east_of_utc() {
        // Sydney starts DST at 02:00 local on 2024-10-06.  Local midnight is
        // still AEST; 00:00 UTC is 10:00 local, already AEDT.
        let d = ymd(2024, 10, 6);
        let utc = DstOracle::new(DstReference::UtcMidnight);
        let local = DstOracle::new(DstReference::LocalMidnight);
        assert_eq!(utc.variant_on(Sydney, d).unwrap(), DstVariant::Daylight);
        assert_eq!(local.variant_on(Sydney, d).unwrap(), DstVariant::Standard);
    }

    #[test]
    fn reference_instant_values() {
        let utc = DstOracle::new(DstReference::UtcMidnight);
        let local = DstOracle::new(DstReference::LocalMidnight);
        let d = ymd(2024, 7, 1);
        assert_eq!(
            utc.reference_instant(New_York, d).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            local.reference_instant(New_York, d).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 4, 0, 0).unwrap()
        );
    }
}

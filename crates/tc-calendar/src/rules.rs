//! Rule layering for daily open/close resolution.
//!
//! Each [`HoursSource`] either has no opinion on a field or states a
//! time-of-day for it.  [`resolve`] folds the sources left to right and the
//! last source with an opinion wins, so a chain ordered
//! `[schedule, periodic rules, date override]` gives date overrides the
//! highest precedence and the base schedule the lowest.

use chrono::NaiveTime;

use crate::schedule::{AdjustmentRule, DaySession, HoursField};

/// Where a resolved time-of-day came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleOrigin {
    /// The weekday's base session.
    Schedule,
    /// A periodic adjustment rule, with its label.
    Periodic(String),
    /// A one-off date-keyed override (early close or late open).
    Override,
}

/// A time-of-day together with the source that set it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resolution {
    /// Resolved time-of-day.
    pub time: NaiveTime,
    /// Source that set it.
    pub origin: RuleOrigin,
}

/// One layer of the precedence chain.
pub trait HoursSource {
    /// This source's time-of-day for `field`, or `None` for no opinion.
    fn opinion(&self, field: HoursField) -> Option<Resolution>;
}

/// Fold `sources` left to right; the last one with an opinion wins.
pub fn resolve(field: HoursField, sources: &[&dyn HoursSource]) -> Option<Resolution> {
    sources.iter().filter_map(|s| s.opinion(field)).last()
}

/// The base session of a weekday.  Always has an opinion.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleLayer<'a> {
    session: &'a DaySession,
}

impl<'a> ScheduleLayer<'a> {
    /// Wrap a base session.
    pub fn new(session: &'a DaySession) -> Self {
        Self { session }
    }
}

impl HoursSource for ScheduleLayer<'_> {
    fn opinion(&self, field: HoursField) -> Option<Resolution> {
        let time = match field {
            HoursField::DailyOpen => self.session.open,
            HoursField::DailyClose => self.session.close,
        };
        Some(Resolution {
            time,
            origin: RuleOrigin::Schedule,
        })
    }
}

/// Periodic rules already filtered to one weekday and DST variant.  When
/// several rules target the same field, the last one listed wins.
#[derive(Debug, Clone, Default)]
pub struct PeriodicLayer<'a> {
    rules: Vec<&'a AdjustmentRule>,
}

impl<'a> PeriodicLayer<'a> {
    /// Wrap the matching rules.
    pub fn new(rules: impl IntoIterator<Item = &'a AdjustmentRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// The rule in effect for `field`, if any.
    pub fn rule(&self, field: HoursField) -> Option<&'a AdjustmentRule> {
        self.rules.iter().rev().find(|r| r.field == field).copied()
    }
}

impl HoursSource for PeriodicLayer<'_> {
    fn opinion(&self, field: HoursField) -> Option<Resolution> {
        self.rule(field).map(|r| Resolution {
            time: r.time,
            origin: RuleOrigin::Periodic(r.label.clone()),
        })
    }
}

/// Date-keyed overrides for one exchange and date.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideLayer {
    late_open: Option<NaiveTime>,
    early_close: Option<NaiveTime>,
}

impl OverrideLayer {
    /// Wrap the override times in effect.
    pub fn new(late_open: Option<NaiveTime>, early_close: Option<NaiveTime>) -> Self {
        Self {
            late_open,
            early_close,
        }
    }
}

impl HoursSource for OverrideLayer {
    fn opinion(&self, field: HoursField) -> Option<Resolution> {
        let time = match field {
            HoursField::DailyOpen => self.late_open,
            HoursField::DailyClose => self.early_close,
        }?;
        Some(Resolution {
            time,
            origin: RuleOrigin::Override,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::parse_hms;
    use crate::dst::DstVariant;
    use crate::weekday::Weekday;

    fn t(s: &str) -> NaiveTime {
        parse_hms(s).unwrap()
    }

    fn friday_close(time: &str, label: &str) -> AdjustmentRule {
        AdjustmentRule::new(
            Weekday::Friday,
            DstVariant::Standard,
            HoursField::DailyClose,
            t(time),
            label,
        )
    }

    #[test]
    fn schedule_alone() {
        let session = DaySession::full_day();
        let base = ScheduleLayer::new(&session);
        let r = resolve(HoursField::DailyClose, &[&base]).unwrap();
        assert_eq!(r.time, t("23:59:59"));
        assert_eq!(r.origin, RuleOrigin::Schedule);
    }

    #[test]
    fn periodic_beats_schedule() {
        let session = DaySession::full_day();
        let rule = friday_close("21:55:00", "Fridays");
        let base = ScheduleLayer::new(&session);
        let periodic = PeriodicLayer::new([&rule]);
        let r = resolve(HoursField::DailyClose, &[&base, &periodic]).unwrap();
        assert_eq!(r.time, t("21:55:00"));
        assert_eq!(r.origin, RuleOrigin::Periodic("Fridays".into()));
        // The open is untouched by a close rule.
        let r = resolve(HoursField::DailyOpen, &[&base, &periodic]).unwrap();
        assert_eq!(r.origin, RuleOrigin::Schedule);
    }

    #[test]
    fn override_beats_periodic() {
        let session = DaySession::full_day();
        let rule = friday_close("21:55:00", "Fridays");
        let base = ScheduleLayer::new(&session);
        let periodic = PeriodicLayer::new([&rule]);
        let one_off = OverrideLayer::new(None, Some(t("18:00:00")));
        let r = resolve(HoursField::DailyClose, &[&base, &periodic, &one_off]).unwrap();
        assert_eq!(r.time, t("18:00:00"));
        assert_eq!(r.origin, RuleOrigin::Override);
    }

    #[test]
    fn last_listed_rule_wins() {
        let first = friday_close("21:55:00", "Fridays");
        let second = friday_close("21:00:00", "Fridays (holiday season)");
        let periodic = PeriodicLayer::new([&first, &second]);
        assert_eq!(
            periodic.rule(HoursField::DailyClose).unwrap().label,
            "Fridays (holiday season)"
        );
        assert!(periodic.rule(HoursField::DailyOpen).is_none());
    }

    #[test]
    fn silent_sources_resolve_to_none() {
        let empty = PeriodicLayer::default();
        let none = OverrideLayer::default();
        assert!(resolve(HoursField::DailyOpen, &[&empty, &none]).is_none());
    }
}

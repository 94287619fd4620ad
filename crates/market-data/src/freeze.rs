//! Freeze gate: decides whether derived values may be recomputed this
//! cycle or must be carried forward unchanged.

use crate::calendar::{is_weekend, HolidayCalendar};
use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

/// Why the gate is frozen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezeReason {
    Weekend,
    Holiday,
    AfterCutoff,
}

/// Gate state for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum GateState {
    Open,
    Frozen(FreezeReason),
}

impl GateState {
    pub fn is_frozen(&self) -> bool {
        matches!(self, GateState::Frozen(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Open => "open",
            GateState::Frozen(_) => "frozen",
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Open => write!(f, "open"),
            GateState::Frozen(reason) => write!(f, "frozen ({:?})", reason),
        }
    }
}

/// Time-of-day freeze policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePolicy {
    /// Freeze once local time reaches `cutoff`
    pub freeze_after_cutoff: bool,
    pub cutoff: NaiveTime,
}

impl Default for FreezePolicy {
    fn default() -> Self {
        Self {
            freeze_after_cutoff: true,
            cutoff: NaiveTime::from_hms_opt(22, 5, 0).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FreezeGate {
    policy: FreezePolicy,
}

impl FreezeGate {
    pub fn new(policy: FreezePolicy) -> Self {
        Self { policy }
    }

    /// Evaluate the gate at local wall-clock time `now`.
    ///
    /// Weekends take precedence over holidays, holidays over the cutoff.
    pub fn evaluate(&self, now: NaiveDateTime, calendar: &HolidayCalendar) -> GateState {
        let today = now.date();
        if is_weekend(today) {
            return GateState::Frozen(FreezeReason::Weekend);
        }
        if calendar.is_listed_holiday(today) {
            return GateState::Frozen(FreezeReason::Holiday);
        }
        if self.policy.freeze_after_cutoff && now.time() >= self.policy.cutoff {
            return GateState::Frozen(FreezeReason::AfterCutoff);
        }
        GateState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekend_always_frozen() {
        let gate = FreezeGate::new(FreezePolicy {
            freeze_after_cutoff: false,
            cutoff: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        });
        let cal = HolidayCalendar::new();

        for hour in [0, 11, 15, 23] {
            // Saturday and Sunday
            assert_eq!(
                gate.evaluate(at(2025, 8, 16, hour, 0), &cal),
                GateState::Frozen(FreezeReason::Weekend)
            );
            assert_eq!(
                gate.evaluate(at(2025, 8, 17, hour, 0), &cal),
                GateState::Frozen(FreezeReason::Weekend)
            );
        }

        // even with the day listed as a holiday
        let cal = HolidayCalendar::from_dates([NaiveDate::from_ymd_opt(2025, 8, 16).unwrap()]);
        assert_matches!(
            gate.evaluate(at(2025, 8, 16, 12, 0), &cal),
            GateState::Frozen(FreezeReason::Weekend)
        );
    }

    #[test]
    fn test_holiday_frozen() {
        let gate = FreezeGate::default();
        let cal = HolidayCalendar::from_dates([NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()]);

        assert_eq!(
            gate.evaluate(at(2025, 8, 15, 11, 0), &cal),
            GateState::Frozen(FreezeReason::Holiday)
        );
        assert_eq!(gate.evaluate(at(2025, 8, 14, 11, 0), &cal), GateState::Open);
    }

    #[test]
    fn test_cutoff() {
        let gate = FreezeGate::default();
        let cal = HolidayCalendar::new();

        assert_eq!(gate.evaluate(at(2025, 8, 14, 22, 4), &cal), GateState::Open);
        assert_eq!(
            gate.evaluate(at(2025, 8, 14, 22, 5), &cal),
            GateState::Frozen(FreezeReason::AfterCutoff)
        );

        let lenient = FreezeGate::new(FreezePolicy {
            freeze_after_cutoff: false,
            ..FreezePolicy::default()
        });
        assert_eq!(lenient.evaluate(at(2025, 8, 14, 23, 30), &cal), GateState::Open);
    }

    #[test]
    fn test_empty_calendar_is_weekend_only() {
        let gate = FreezeGate::new(FreezePolicy {
            freeze_after_cutoff: false,
            ..FreezePolicy::default()
        });
        let cal = HolidayCalendar::default();

        assert_eq!(gate.evaluate(at(2025, 12, 25, 12, 0), &cal), GateState::Open);
        assert!(gate.evaluate(at(2025, 12, 27, 12, 0), &cal).is_frozen());
    }

    #[test]
    fn test_display() {
        assert_eq!(GateState::Open.to_string(), "open");
        assert_eq!(GateState::Frozen(FreezeReason::Holiday).as_str(), "frozen");
    }
}

//! Plan Limits

use std::{fmt, str::FromStr};

use jiff::{Timestamp, tz::TimeZone};
use serde::Serialize;
use thiserror::Error;

/// A capped resource on a tenant's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    /// Active instructors.
    Instructors,

    /// Registered students.
    Students,

    /// Lessons created in the current calendar month.
    MonthlyBookings,
}

/// Unrecognised limit name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown limit '{0}'")]
pub struct UnknownLimit(pub String);

impl LimitKind {
    /// Stable name of the limit.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instructors => "instructors",
            Self::Students => "students",
            Self::MonthlyBookings => "monthly_bookings",
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitKind {
    type Err = UnknownLimit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructors" => Ok(Self::Instructors),
            "students" => Ok(Self::Students),
            "monthly_bookings" => Ok(Self::MonthlyBookings),
            other => Err(UnknownLimit(other.to_string())),
        }
    }
}

/// Caps from a tenant's plan. `None` means uncapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    /// Maximum active instructors.
    pub max_instructors: Option<u32>,

    /// Maximum registered students.
    pub max_students: Option<u32>,

    /// Maximum lessons created per calendar month.
    pub max_monthly_bookings: Option<u32>,
}

impl PlanLimits {
    /// Cap for `kind`.
    pub const fn cap(&self, kind: LimitKind) -> Option<u32> {
        match kind {
            LimitKind::Instructors => self.max_instructors,
            LimitKind::Students => self.max_students,
            LimitKind::MonthlyBookings => self.max_monthly_bookings,
        }
    }

    /// Whether one more `kind` may be created given `current_count` existing ones.
    pub fn allows(&self, kind: LimitKind, current_count: u64) -> bool {
        self.cap(kind)
            .is_none_or(|cap| current_count < u64::from(cap))
    }

    /// Like [`PlanLimits::allows`], addressed by limit name.
    ///
    /// Unknown names are allowed: a limit the plan does not know about is not enforced.
    pub fn allows_named(&self, limit: &str, current_count: u64) -> bool {
        let Ok(kind) = limit.parse::<LimitKind>() else {
            return true;
        };

        self.allows(kind, current_count)
    }
}

/// Start of the calendar month containing `now`, in the tenant's time zone.
///
/// Monthly booking counts include lessons created at or after this instant.
///
/// # Errors
///
/// Returns an error when the local month start cannot be resolved in `tz`.
pub fn month_start(now: Timestamp, tz: &TimeZone) -> Result<Timestamp, jiff::Error> {
    let first = now.to_zoned(tz.clone()).date().first_of_month();

    Ok(first.to_zoned(tz.clone())?.timestamp())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const PLAN: PlanLimits = PlanLimits {
        max_instructors: Some(2),
        max_students: Some(100),
        max_monthly_bookings: Some(0),
    };

    #[test]
    fn below_cap_is_allowed() {
        assert!(PLAN.allows(LimitKind::Instructors, 1));
        assert!(PLAN.allows(LimitKind::Students, 99));
    }

    #[test]
    fn at_cap_is_refused() {
        assert!(!PLAN.allows(LimitKind::Instructors, 2));
        assert!(!PLAN.allows(LimitKind::Students, 100));
        assert!(!PLAN.allows(LimitKind::MonthlyBookings, 0));
    }

    #[test]
    fn uncapped_plan_allows_everything() {
        let plan = PlanLimits::default();

        assert!(plan.allows(LimitKind::MonthlyBookings, u64::MAX));
    }

    #[test]
    fn unknown_limit_names_fail_open() {
        assert!(PLAN.allows_named("api_calls", u64::MAX));
        assert!(!PLAN.allows_named("instructors", 2));
    }

    #[test]
    fn names_round_trip() {
        for kind in [
            LimitKind::Instructors,
            LimitKind::Students,
            LimitKind::MonthlyBookings,
        ] {
            assert_eq!(kind.as_str().parse::<LimitKind>(), Ok(kind));
        }
    }

    #[test]
    fn month_starts_in_tenant_time_zone() -> TestResult {
        let tz = TimeZone::get("Australia/Sydney")?;

        // 2024-06-30T20:00Z is already 1 July in Sydney
        let now: Timestamp = "2024-06-30T20:00:00Z".parse()?;

        assert_eq!(
            month_start(now, &tz)?,
            "2024-06-30T14:00:00Z".parse::<Timestamp>()?
        );
        assert_eq!(
            month_start(now, &TimeZone::UTC)?,
            "2024-06-01T00:00:00Z".parse::<Timestamp>()?
        );

        Ok(())
    }
}

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)`.
///
/// All overlap arithmetic in the service goes through this type so that
/// create, reschedule and slot enumeration agree on boundary semantics:
/// an interval ending exactly when another starts does not overlap it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// Build an interval from a start instant and a duration in minutes.
    /// The end is always derived, never carried independently.
    pub fn from_start(start: NaiveDateTime, duration_minutes: i64) -> Self {
        Interval {
            start,
            end: start + Duration::minutes(duration_minutes),
        }
    }

    /// Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
    /// `s1 < e2 && s2 < e1`. Touching boundaries (`e1 == s2`) are not
    /// an overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Whether `candidate` collides with any of `existing`.
///
/// Callers are expected to pass only calendar-holding intervals; filtering
/// out rejected/cancelled/completed appointments happens at the store.
pub fn conflicts(candidate: &Interval, existing: &[Interval]) -> bool {
    existing.iter().any(|busy| candidate.overlaps(busy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 15)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn overlapping_intervals_conflict() {
        let a = Interval::from_start(at(14, 0), 60);
        let b = Interval::from_start(at(14, 30), 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_boundary_is_not_a_conflict() {
        // [14:00, 15:00) then [15:00, 15:30): adjacent, not overlapping.
        let a = Interval::from_start(at(14, 0), 60);
        let b = Interval::from_start(at(15, 0), 30);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_interval_conflicts() {
        let outer = Interval::from_start(at(9, 0), 180);
        let inner = Interval::from_start(at(10, 0), 30);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn identical_intervals_conflict() {
        let a = Interval::from_start(at(14, 0), 30);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn conflicts_scans_all_existing() {
        let busy = vec![
            Interval::from_start(at(9, 0), 30),
            Interval::from_start(at(14, 0), 60),
        ];
        assert!(conflicts(&Interval::from_start(at(14, 30), 30), &busy));
        assert!(!conflicts(&Interval::from_start(at(10, 0), 30), &busy));
        assert!(!conflicts(&Interval::from_start(at(15, 0), 30), &busy));
    }

    #[test]
    fn empty_calendar_never_conflicts() {
        assert!(!conflicts(&Interval::from_start(at(8, 0), 480), &[]));
    }
}

use chrono::{Datelike, Duration, Months, NaiveDateTime, NaiveTime, Weekday};

use super::error::SchedulingError;
use super::interval::Interval;

/// Temporal policy knobs for the scheduling engine. Built once from
/// configuration and shared by every request.
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    pub business_open: NaiveTime,
    pub business_close: NaiveTime,
    pub slot_step_minutes: i64,
    /// How far ahead an appointment may be booked.
    pub horizon_months: u32,
    /// Minimum gap between now and the current start before a reschedule
    /// is permitted.
    pub edit_lead_hours: i64,
    /// Minimum gap between now and the start before a cancellation is
    /// permitted.
    pub cancel_lead_hours: i64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        SchedulingPolicy {
            business_open: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            business_close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            slot_step_minutes: 30,
            horizon_months: 3,
            edit_lead_hours: 24,
            cancel_lead_hours: 2,
        }
    }
}

impl SchedulingPolicy {
    /// The latest bookable instant given `now`.
    pub fn horizon_end(&self, now: NaiveDateTime) -> NaiveDateTime {
        now.checked_add_months(Months::new(self.horizon_months))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// Request-shape checks for a candidate start, in a fixed fail-fast
/// order: past, horizon, business hours, weekday. Lead-time policy and
/// the conflict check are applied separately by the engine, after these
/// pass, so an obviously malformed request never triggers a store query.
pub fn validate_schedulable(
    start: NaiveDateTime,
    duration_minutes: i64,
    now: NaiveDateTime,
    policy: &SchedulingPolicy,
) -> Result<(), SchedulingError> {
    if start <= now {
        return Err(SchedulingError::InvalidPastSchedule);
    }

    if start > policy.horizon_end(now) {
        return Err(SchedulingError::HorizonExceeded(policy.horizon_months));
    }

    check_business_hours(start, duration_minutes, policy)?;

    if matches!(start.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(SchedulingError::WeekendNotAllowed);
    }

    Ok(())
}

/// The start's time-of-day must fall in `[open, close)` and the derived
/// end must still fit before close on the same day. Checking the end here
/// keeps direct creation in agreement with slot enumeration, which never
/// offers a slot that would overrun close.
fn check_business_hours(
    start: NaiveDateTime,
    duration_minutes: i64,
    policy: &SchedulingPolicy,
) -> Result<(), SchedulingError> {
    let time = start.time();
    if time < policy.business_open || time >= policy.business_close {
        return Err(SchedulingError::OutsideBusinessHours);
    }

    let end = start + Duration::minutes(duration_minutes);
    let close = start.date().and_time(policy.business_close);
    if end > close {
        return Err(SchedulingError::OutsideBusinessHours);
    }

    Ok(())
}

/// A reschedule must happen at least `edit_lead_hours` before the
/// appointment's current start.
pub fn check_edit_lead_time(
    current_start: NaiveDateTime,
    now: NaiveDateTime,
    policy: &SchedulingPolicy,
) -> Result<(), SchedulingError> {
    if current_start - now < Duration::hours(policy.edit_lead_hours) {
        return Err(SchedulingError::InsufficientEditLeadTime(
            policy.edit_lead_hours,
        ));
    }
    Ok(())
}

/// A cancellation must happen at least `cancel_lead_hours` before the
/// appointment starts.
pub fn check_cancel_lead_time(
    start: NaiveDateTime,
    now: NaiveDateTime,
    policy: &SchedulingPolicy,
) -> Result<(), SchedulingError> {
    if start - now < Duration::hours(policy.cancel_lead_hours) {
        return Err(SchedulingError::InsufficientCancelLeadTime(
            policy.cancel_lead_hours,
        ));
    }
    Ok(())
}

/// Conflict check against a professional's calendar-holding intervals.
pub fn check_conflicts(
    candidate: &Interval,
    existing: &[Interval],
) -> Result<(), SchedulingError> {
    if super::interval::conflicts(candidate, existing) {
        return Err(SchedulingError::SlotConflict);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn policy() -> SchedulingPolicy {
        SchedulingPolicy::default()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // 2024-02-12 is a Monday.
    fn now() -> NaiveDateTime {
        dt(2024, 2, 12, 9, 0)
    }

    #[test]
    fn valid_weekday_slot_passes() {
        assert!(validate_schedulable(dt(2024, 2, 15, 14, 0), 60, now(), &policy()).is_ok());
    }

    #[test]
    fn start_in_the_past_is_rejected() {
        let err = validate_schedulable(dt(2024, 2, 9, 10, 0), 30, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidPastSchedule));
    }

    #[test]
    fn start_equal_to_now_is_rejected() {
        let err = validate_schedulable(now(), 30, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidPastSchedule));
    }

    #[test]
    fn start_beyond_horizon_is_rejected() {
        // Three months from 2024-02-12 09:00 is 2024-05-12 09:00.
        let err = validate_schedulable(dt(2024, 5, 13, 10, 0), 30, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::HorizonExceeded(3)));
    }

    #[test]
    fn start_exactly_at_horizon_passes_other_checks() {
        // 2024-05-10 is a Friday inside business hours.
        assert!(validate_schedulable(dt(2024, 5, 10, 9, 0), 30, now(), &policy()).is_ok());
    }

    #[test]
    fn before_open_is_outside_business_hours() {
        let err = validate_schedulable(dt(2024, 2, 15, 7, 30), 30, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideBusinessHours));
    }

    #[test]
    fn start_at_open_is_allowed() {
        assert!(validate_schedulable(dt(2024, 2, 15, 8, 0), 30, now(), &policy()).is_ok());
    }

    #[test]
    fn start_at_close_is_outside_business_hours() {
        let err = validate_schedulable(dt(2024, 2, 15, 18, 0), 30, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideBusinessHours));
    }

    #[test]
    fn end_overrunning_close_is_outside_business_hours() {
        // 17:30 + 60min ends 18:30, past close.
        let err = validate_schedulable(dt(2024, 2, 15, 17, 30), 60, now(), &policy()).unwrap_err();
        assert!(matches!(err, SchedulingError::OutsideBusinessHours));
    }

    #[test]
    fn end_exactly_at_close_is_allowed() {
        assert!(validate_schedulable(dt(2024, 2, 15, 17, 30), 30, now(), &policy()).is_ok());
    }

    #[test]
    fn weekend_is_rejected_without_a_store_query() {
        // 2024-02-17 is a Saturday, 2024-02-18 a Sunday.
        for day in [17, 18] {
            let err =
                validate_schedulable(dt(2024, 2, day, 10, 0), 30, now(), &policy()).unwrap_err();
            assert!(matches!(err, SchedulingError::WeekendNotAllowed));
        }
    }

    #[test]
    fn edit_lead_time_boundaries() {
        let p = policy();
        // 10 hours ahead: too close to edit.
        let err = check_edit_lead_time(now() + Duration::hours(10), now(), &p).unwrap_err();
        assert!(matches!(err, SchedulingError::InsufficientEditLeadTime(24)));
        // Exactly 24 hours ahead is allowed.
        assert!(check_edit_lead_time(now() + Duration::hours(24), now(), &p).is_ok());
    }

    #[test]
    fn cancel_lead_time_boundaries() {
        let p = policy();
        let err = check_cancel_lead_time(now() + Duration::minutes(90), now(), &p).unwrap_err();
        assert!(matches!(err, SchedulingError::InsufficientCancelLeadTime(2)));
        assert!(check_cancel_lead_time(now() + Duration::hours(2), now(), &p).is_ok());
    }

    #[test]
    fn conflict_check_uses_the_shared_predicate() {
        let busy = vec![Interval::from_start(dt(2024, 2, 15, 14, 0), 60)];
        let err = check_conflicts(&Interval::from_start(dt(2024, 2, 15, 14, 30), 30), &busy)
            .unwrap_err();
        assert!(matches!(err, SchedulingError::SlotConflict));
        // Touching boundary books fine.
        assert!(check_conflicts(&Interval::from_start(dt(2024, 2, 15, 15, 0), 30), &busy).is_ok());
    }
}

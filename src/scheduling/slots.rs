use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::interval::{conflicts, Interval};
use super::rules::SchedulingPolicy;

/// Why a candidate slot cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotUnavailableReason {
    Occupied,
    OutsideBusinessHours,
}

/// One candidate start time within business hours.
#[derive(Debug, Clone, Serialize)]
pub struct SlotResult {
    pub start: NaiveDateTime,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotUnavailableReason>,
}

impl SlotResult {
    fn available(start: NaiveDateTime) -> Self {
        SlotResult {
            start,
            available: true,
            reason: None,
        }
    }

    fn unavailable(start: NaiveDateTime, reason: SlotUnavailableReason) -> Self {
        SlotResult {
            start,
            available: false,
            reason: Some(reason),
        }
    }
}

/// Enumerate fixed-step candidate start times across the business-hours
/// window of `date` for a service of `duration_minutes`.
///
/// Every step in `[open, close)` is emitted; slots are independent and a
/// conflict never skips the following steps. A candidate whose derived
/// end would overrun close is reported as outside business hours instead
/// of being offered as bookable.
///
/// Pure given its inputs: the caller fetches the day's busy intervals
/// once and passes them in.
pub fn generate_slots(
    date: NaiveDate,
    duration_minutes: i64,
    policy: &SchedulingPolicy,
    busy: &[Interval],
) -> Vec<SlotResult> {
    let open = date.and_time(policy.business_open);
    let close = date.and_time(policy.business_close);
    let step = Duration::minutes(policy.slot_step_minutes);

    let mut slots = Vec::new();
    let mut start = open;

    while start < close {
        let candidate = Interval::from_start(start, duration_minutes);

        let slot = if candidate.end > close {
            SlotResult::unavailable(start, SlotUnavailableReason::OutsideBusinessHours)
        } else if conflicts(&candidate, busy) {
            SlotResult::unavailable(start, SlotUnavailableReason::Occupied)
        } else {
            SlotResult::available(start)
        };

        slots.push(slot);
        start += step;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        // A Thursday.
        NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
    }

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        date().and_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn full_day_of_half_hour_slots() {
        let slots = generate_slots(date(), 30, &SchedulingPolicy::default(), &[]);
        // 08:00..18:00 at 30-minute steps.
        assert_eq!(slots.len(), 20);
        assert_eq!(slots.first().unwrap().start, at(8, 0));
        assert_eq!(slots.last().unwrap().start, at(17, 30));
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn busy_interval_marks_overlapping_slots_occupied() {
        let busy = vec![Interval::from_start(at(14, 0), 60)];
        let slots = generate_slots(date(), 30, &SchedulingPolicy::default(), &busy);

        let find = |h, m| {
            slots
                .iter()
                .find(|s| s.start == at(h, m))
                .expect("slot present")
        };

        assert!(!find(14, 0).available);
        assert_eq!(find(14, 0).reason, Some(SlotUnavailableReason::Occupied));
        assert!(!find(14, 30).available);
        // The slot starting exactly when the busy interval ends is free.
        assert!(find(15, 0).available);
        // And the one ending exactly when it starts is free too.
        assert!(find(13, 30).available);
    }

    #[test]
    fn slots_overrunning_close_are_flagged_not_offered() {
        // 90-minute service: 17:00 and 17:30 would end past 18:00.
        let slots = generate_slots(date(), 90, &SchedulingPolicy::default(), &[]);

        let overrunning: Vec<_> = slots.iter().filter(|s| !s.available).collect();
        assert_eq!(overrunning.len(), 2);
        assert!(overrunning
            .iter()
            .all(|s| s.reason == Some(SlotUnavailableReason::OutsideBusinessHours)));
        assert_eq!(overrunning[0].start, at(17, 0));
        assert_eq!(overrunning[1].start, at(17, 30));

        // 16:30 + 90min lands exactly on close and is bookable.
        let boundary = slots.iter().find(|s| s.start == at(16, 30)).unwrap();
        assert!(boundary.available);
    }

    #[test]
    fn a_conflict_does_not_skip_following_slots() {
        let busy = vec![Interval::from_start(at(8, 0), 30)];
        let slots = generate_slots(date(), 30, &SchedulingPolicy::default(), &busy);
        assert!(!slots[0].available);
        assert!(slots[1].available);
        assert_eq!(slots.len(), 20);
    }

    #[test]
    fn custom_step_and_hours_are_respected() {
        let policy = SchedulingPolicy {
            business_open: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            business_close: chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            slot_step_minutes: 60,
            ..SchedulingPolicy::default()
        };
        let slots = generate_slots(date(), 60, &policy, &[]);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[2].start, at(11, 0));
    }
}

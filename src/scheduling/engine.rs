use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::clock::Clock;
use super::error::SchedulingError;
use super::interval::Interval;
use super::rules::{self, SchedulingPolicy};
use super::slots::{self, SlotResult};
use super::status::{self, Actor, AppointmentStatus};
use crate::db::models::Appointment;

/// A committed appointment interval on a professional's calendar,
/// tagged with its owning appointment so edits can exclude themselves.
#[derive(Debug, Clone)]
pub struct BusyInterval {
    pub appointment_id: String,
    pub interval: Interval,
}

/// Read-side calendar collaborator. Implementations must return only
/// calendar-holding (PENDING/ACCEPTED) appointments whose interval
/// overlaps `[from, to)`; ordering is not required.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn fetch_intervals(
        &self,
        professional_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, SchedulingError>;
}

/// Service-catalog collaborator: resolves a booked service to its
/// duration in minutes. Durations are guaranteed positive by the catalog.
#[async_trait]
pub trait ServiceResolver: Send + Sync {
    async fn resolve_duration(
        &self,
        service_id: &str,
        professional_id: &str,
    ) -> Result<i64, SchedulingError>;
}

/// A request to book a professional's time.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub client_id: String,
    pub professional_id: String,
    pub service_id: String,
    pub start: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Decides what a professional's calendar looks like: whether a new or
/// edited appointment collides with existing commitments, which slots of
/// a day are free, and which status transitions are legal.
///
/// The engine holds no shared mutable state and performs no writes; it
/// returns decisions and the caller persists them. Conflict checking here
/// is necessary but not sufficient under concurrency: two racing creates
/// can both pass the check, so the storage layer must close the window
/// with a guarded write (see `AppointmentRepository::insert_if_free`).
pub struct SchedulingEngine<S, R, C> {
    store: S,
    services: R,
    clock: C,
    policy: SchedulingPolicy,
}

impl<S, R, C> SchedulingEngine<S, R, C>
where
    S: CalendarStore,
    R: ServiceResolver,
    C: Clock,
{
    pub fn new(store: S, services: R, clock: C, policy: SchedulingPolicy) -> Self {
        SchedulingEngine {
            store,
            services,
            clock,
            policy,
        }
    }

    /// Validate a booking request and produce the PENDING appointment for
    /// the caller to persist.
    pub async fn create(&self, request: BookingRequest) -> Result<Appointment, SchedulingError> {
        let now = self.clock.now();

        // Duration comes first: the business-hours check needs the
        // derived end. It is a point lookup; the calendar fetch still
        // only happens once the request shape is known to be valid.
        let duration_minutes = self
            .services
            .resolve_duration(&request.service_id, &request.professional_id)
            .await?;

        rules::validate_schedulable(request.start, duration_minutes, now, &self.policy)?;

        let candidate = Interval::from_start(request.start, duration_minutes);
        let busy = self
            .fetch_busy(&request.professional_id, candidate, None)
            .await?;
        rules::check_conflicts(&candidate, &busy)?;

        tracing::debug!(
            professional_id = %request.professional_id,
            start = %request.start,
            duration_minutes,
            "booking request accepted"
        );

        Ok(Appointment {
            id: Uuid::new_v4().to_string(),
            client_id: request.client_id,
            professional_id: request.professional_id,
            service_id: request.service_id,
            start_time: request.start,
            duration_minutes,
            status: AppointmentStatus::Pending,
            location: request.location,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move an existing appointment to a new start. Status is untouched;
    /// the appointment's own interval is excluded from the conflict check.
    pub async fn reschedule(
        &self,
        existing: &Appointment,
        new_start: NaiveDateTime,
    ) -> Result<Appointment, SchedulingError> {
        let now = self.clock.now();

        // A terminal appointment no longer holds the calendar and cannot
        // be revived through an edit.
        if !existing.status.holds_calendar() {
            return Err(SchedulingError::InvalidStatusTransition {
                from: existing.status,
                to: existing.status,
            });
        }

        rules::validate_schedulable(new_start, existing.duration_minutes, now, &self.policy)?;
        rules::check_edit_lead_time(existing.start_time, now, &self.policy)?;

        let candidate = Interval::from_start(new_start, existing.duration_minutes);
        let busy = self
            .fetch_busy(&existing.professional_id, candidate, Some(&existing.id))
            .await?;
        rules::check_conflicts(&candidate, &busy)?;

        tracing::debug!(
            appointment_id = %existing.id,
            old_start = %existing.start_time,
            new_start = %new_start,
            "reschedule accepted"
        );

        let mut updated = existing.clone();
        updated.start_time = new_start;
        updated.updated_at = now;
        Ok(updated)
    }

    /// Enumerate the day's candidate slots for a service duration,
    /// marking each free or occupied.
    pub async fn check_availability(
        &self,
        professional_id: &str,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<Vec<SlotResult>, SchedulingError> {
        let day_start = date.and_time(self.policy.business_open);
        let day_end = date.and_time(self.policy.business_close);

        let busy: Vec<Interval> = self
            .store
            .fetch_intervals(professional_id, day_start, day_end)
            .await?
            .into_iter()
            .map(|b| b.interval)
            .collect();

        Ok(slots::generate_slots(
            date,
            duration_minutes,
            &self.policy,
            &busy,
        ))
    }

    /// Apply a status transition if the lifecycle machine and the cancel
    /// lead-time policy allow it.
    pub async fn change_status(
        &self,
        existing: &Appointment,
        target: AppointmentStatus,
        actor: &Actor,
    ) -> Result<Appointment, SchedulingError> {
        let now = self.clock.now();

        status::validate_transition(existing, target, actor, now)?;

        if target == AppointmentStatus::Cancelled {
            rules::check_cancel_lead_time(existing.start_time, now, &self.policy)?;
        }

        tracing::debug!(
            appointment_id = %existing.id,
            from = %existing.status,
            to = %target,
            actor_id = %actor.id,
            "status transition accepted"
        );

        let mut updated = existing.clone();
        updated.status = target;
        updated.updated_at = now;
        Ok(updated)
    }

    /// Fetch calendar-holding intervals overlapping `candidate`,
    /// optionally excluding the appointment being edited.
    async fn fetch_busy(
        &self,
        professional_id: &str,
        candidate: Interval,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Interval>, SchedulingError> {
        let entries = self
            .store
            .fetch_intervals(professional_id, candidate.start, candidate.end)
            .await?;

        Ok(entries
            .into_iter()
            .filter(|b| exclude_id != Some(b.appointment_id.as_str()))
            .map(|b| b.interval)
            .collect())
    }
}

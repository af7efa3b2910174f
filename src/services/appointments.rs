use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::Appointment;
use crate::db::{AppointmentRepository, ServiceRepository};
use crate::error::{AppError, AppResult};
use crate::scheduling::{
    Actor, ActorRole, AppointmentStatus, BookingRequest, BusyInterval, CalendarStore,
    SchedulingEngine, SchedulingError, ServiceResolver, SlotResult, SystemClock,
};
use crate::AppState;

/// Calendar collaborator backed by the appointments table. Returns only
/// calendar-holding rows, as the engine expects.
pub struct SqlCalendarStore {
    pool: SqlitePool,
}

#[async_trait]
impl CalendarStore for SqlCalendarStore {
    async fn fetch_intervals(
        &self,
        professional_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<BusyInterval>, SchedulingError> {
        let rows = AppointmentRepository::find_calendar_holding_in_range(
            &self.pool,
            professional_id,
            from,
            to,
        )
        .await
        .map_err(|e| SchedulingError::Storage(anyhow::anyhow!(e)))?;

        Ok(rows
            .into_iter()
            .map(|a| BusyInterval {
                interval: a.interval(),
                appointment_id: a.id,
            })
            .collect())
    }
}

/// Service-catalog collaborator backed by the professional_services table.
pub struct SqlServiceResolver {
    pool: SqlitePool,
}

#[async_trait]
impl ServiceResolver for SqlServiceResolver {
    async fn resolve_duration(
        &self,
        service_id: &str,
        professional_id: &str,
    ) -> Result<i64, SchedulingError> {
        let service = ServiceRepository::find_active(&self.pool, service_id, professional_id)
            .await
            .map_err(|e| SchedulingError::Storage(anyhow::anyhow!(e)))?;

        match service {
            Some(s) => Ok(s.duration_minutes),
            None => {
                let known = ServiceRepository::professional_exists(&self.pool, professional_id)
                    .await
                    .map_err(|e| SchedulingError::Storage(anyhow::anyhow!(e)))?;
                if known {
                    Err(SchedulingError::ServiceNotFound)
                } else {
                    Err(SchedulingError::ProfessionalNotFound)
                }
            }
        }
    }
}

type Engine = SchedulingEngine<SqlCalendarStore, SqlServiceResolver, SystemClock>;

fn engine(state: &Arc<AppState>) -> Engine {
    SchedulingEngine::new(
        SqlCalendarStore {
            pool: state.db.clone(),
        },
        SqlServiceResolver {
            pool: state.db.clone(),
        },
        SystemClock,
        state.config.scheduling.policy(),
    )
}

#[derive(Debug, Clone)]
pub struct CreateAppointmentInput {
    pub professional_id: String,
    pub service_id: String,
    pub start: NaiveDateTime,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Orchestrates the scheduling engine against persistence. The engine
/// decides; this layer persists through guarded writes, so a decision
/// invalidated by a concurrent writer surfaces as `SlotConflict` instead
/// of a double booking.
pub struct AppointmentService;

impl AppointmentService {
    /// Book an appointment. The actor is the booking client.
    pub async fn create(
        state: &Arc<AppState>,
        actor: &Actor,
        input: CreateAppointmentInput,
    ) -> AppResult<Appointment> {
        if actor.role != ActorRole::Client {
            return Err(AppError::Forbidden);
        }

        let appointment = engine(state)
            .create(BookingRequest {
                client_id: actor.id.clone(),
                professional_id: input.professional_id,
                service_id: input.service_id,
                start: input.start,
                location: input.location,
                notes: input.notes,
            })
            .await?;

        // Guarded insert: a concurrent create may have taken the slot
        // between the engine's check and this write.
        if !AppointmentRepository::insert_if_free(&state.db, &appointment).await? {
            return Err(SchedulingError::SlotConflict.into());
        }

        info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            start = %appointment.start_time,
            "appointment created"
        );

        Ok(appointment)
    }

    /// Move an appointment to a new start time. Either participant may
    /// reschedule; the engine enforces the lead-time and conflict rules.
    pub async fn reschedule(
        state: &Arc<AppState>,
        actor: &Actor,
        appointment_id: &str,
        new_start: NaiveDateTime,
    ) -> AppResult<Appointment> {
        let existing = Self::load_for_participant(state, actor, appointment_id).await?;

        let updated = engine(state).reschedule(&existing, new_start).await?;

        if !AppointmentRepository::update_schedule_if_free(&state.db, &updated).await? {
            return Err(SchedulingError::SlotConflict.into());
        }

        info!(
            appointment_id = %updated.id,
            old_start = %existing.start_time,
            new_start = %updated.start_time,
            "appointment rescheduled"
        );

        Ok(updated)
    }

    /// Apply a status transition on behalf of the actor.
    pub async fn change_status(
        state: &Arc<AppState>,
        actor: &Actor,
        appointment_id: &str,
        target: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let existing = AppointmentRepository::find_by_id(&state.db, appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {appointment_id} not found")))?;

        let decided = engine(state).change_status(&existing, target, actor).await?;

        let updated =
            AppointmentRepository::update_status(&state.db, &decided.id, decided.status, decided.updated_at)
                .await?;

        info!(
            appointment_id = %updated.id,
            from = %existing.status,
            to = %updated.status,
            actor_id = %actor.id,
            "appointment status changed"
        );

        Ok(updated)
    }

    /// Enumerate a professional's free and occupied slots for a day.
    pub async fn availability(
        state: &Arc<AppState>,
        professional_id: &str,
        service_id: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<SlotResult>> {
        let resolver = SqlServiceResolver {
            pool: state.db.clone(),
        };
        let duration_minutes = resolver
            .resolve_duration(service_id, professional_id)
            .await?;

        let slots = engine(state)
            .check_availability(professional_id, date, duration_minutes)
            .await?;

        Ok(slots)
    }

    pub async fn get(
        state: &Arc<AppState>,
        actor: &Actor,
        appointment_id: &str,
    ) -> AppResult<Appointment> {
        Self::load_for_participant(state, actor, appointment_id).await
    }

    /// All appointments the actor participates in, ordered by start.
    pub async fn list_for_actor(state: &Arc<AppState>, actor: &Actor) -> AppResult<Vec<Appointment>> {
        match actor.role {
            ActorRole::Client => AppointmentRepository::list_for_client(&state.db, &actor.id).await,
            ActorRole::Professional => {
                AppointmentRepository::list_for_professional(&state.db, &actor.id).await
            }
        }
    }

    async fn load_for_participant(
        state: &Arc<AppState>,
        actor: &Actor,
        appointment_id: &str,
    ) -> AppResult<Appointment> {
        let appointment = AppointmentRepository::find_by_id(&state.db, appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {appointment_id} not found")))?;

        if !actor.is_participant_of(&appointment) {
            return Err(AppError::Forbidden);
        }

        Ok(appointment)
    }
}

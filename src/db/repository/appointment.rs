use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::db::models::Appointment;
use crate::error::{AppError, AppResult};
use crate::scheduling::AppointmentStatus;

const COLUMNS: &str = "id, client_id, professional_id, service_id, start_time, \
                       duration_minutes, status, location, notes, created_at, updated_at";

/// Repository for the `appointments` table.
///
/// The write paths re-state the overlap predicate inside the statement
/// (`WHERE NOT EXISTS` over calendar-holding rows), so the check the
/// engine performed cannot be invalidated by a concurrent writer between
/// decision and persistence. A guarded write that affects zero rows means
/// the slot was taken in the meantime.
pub struct AppointmentRepository;

impl AppointmentRepository {
    /// Insert a freshly decided appointment unless a calendar-holding row
    /// for the same professional already overlaps `[start, end)`.
    /// Returns `false` when the guard suppressed the insert.
    pub async fn insert_if_free(pool: &SqlitePool, appointment: &Appointment) -> AppResult<bool> {
        let end = appointment.scheduled_end();

        let result = sqlx::query(
            r#"
            INSERT INTO appointments (
                id, client_id, professional_id, service_id, start_time,
                duration_minutes, status, location, notes, created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11
            WHERE NOT EXISTS (
                SELECT 1 FROM appointments
                WHERE professional_id = ?3
                  AND status IN ('pending', 'accepted')
                  AND start_time < ?12
                  AND datetime(start_time, '+' || duration_minutes || ' minutes') > ?5
            )
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.client_id)
        .bind(&appointment.professional_id)
        .bind(&appointment.service_id)
        .bind(appointment.start_time)
        .bind(appointment.duration_minutes)
        .bind(appointment.status)
        .bind(&appointment.location)
        .bind(&appointment.notes)
        .bind(appointment.created_at)
        .bind(appointment.updated_at)
        .bind(end)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    /// Move an appointment to a new start unless another calendar-holding
    /// row for the same professional overlaps the new interval. The row
    /// itself is excluded from the guard. Returns `false` when the guard
    /// suppressed the update.
    pub async fn update_schedule_if_free(
        pool: &SqlitePool,
        appointment: &Appointment,
    ) -> AppResult<bool> {
        let end = appointment.scheduled_end();

        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET start_time = ?2, updated_at = ?3
            WHERE id = ?1
              AND NOT EXISTS (
                SELECT 1 FROM appointments
                WHERE professional_id = ?4
                  AND id != ?1
                  AND status IN ('pending', 'accepted')
                  AND start_time < ?5
                  AND datetime(start_time, '+' || duration_minutes || ' minutes') > ?2
              )
            "#,
        )
        .bind(&appointment.id)
        .bind(appointment.start_time)
        .bind(appointment.updated_at)
        .bind(&appointment.professional_id)
        .bind(end)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    /// Persist a status transition decided by the engine.
    pub async fn update_status(
        pool: &SqlitePool,
        id: &str,
        status: AppointmentStatus,
        updated_at: NaiveDateTime,
    ) -> AppResult<Appointment> {
        let sql = format!(
            "UPDATE appointments SET status = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(status)
            .bind(updated_at)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        row.ok_or_else(|| AppError::NotFound(format!("Appointment {id} not found")))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Appointment>> {
        let sql = format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1");

        sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)
    }

    /// Calendar-holding (pending/accepted) appointments for a
    /// professional whose interval overlaps `[from, to)`.
    pub async fn find_calendar_holding_in_range(
        pool: &SqlitePool,
        professional_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<Appointment>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM appointments
            WHERE professional_id = ?1
              AND status IN ('pending', 'accepted')
              AND start_time < ?3
              AND datetime(start_time, '+' || duration_minutes || ' minutes') > ?2
            "#
        );

        sqlx::query_as::<_, Appointment>(&sql)
            .bind(professional_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn list_for_professional(
        pool: &SqlitePool,
        professional_id: &str,
    ) -> AppResult<Vec<Appointment>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM appointments WHERE professional_id = ?1 ORDER BY start_time"
        );

        sqlx::query_as::<_, Appointment>(&sql)
            .bind(professional_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }

    pub async fn list_for_client(pool: &SqlitePool, client_id: &str) -> AppResult<Vec<Appointment>> {
        let sql =
            format!("SELECT {COLUMNS} FROM appointments WHERE client_id = ?1 ORDER BY start_time");

        sqlx::query_as::<_, Appointment>(&sql)
            .bind(client_id)
            .fetch_all(pool)
            .await
            .map_err(AppError::Database)
    }
}

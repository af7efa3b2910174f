use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::db::models::Appointment;
use crate::error::AppResult;
use crate::routes::actor::ActorContext;
use crate::scheduling::AppointmentStatus;
use crate::services::appointments::{AppointmentService, CreateAppointmentInput};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_appointment).get(list_appointments))
        .route("/:id", get(get_appointment))
        .route("/:id/reschedule", patch(reschedule_appointment))
        .route("/:id/status", patch(change_status))
}

#[derive(Debug, Deserialize)]
struct CreateAppointmentRequest {
    professional_id: String,
    service_id: String,
    /// Combined date + time, e.g. "2024-02-15T14:30:00".
    start: NaiveDateTime,
    location: Option<String>,
    notes: Option<String>,
}

async fn create_appointment(
    State(state): State<Arc<AppState>>,
    ActorContext(actor): ActorContext,
    Json(request): Json<CreateAppointmentRequest>,
) -> AppResult<Json<Appointment>> {
    let appointment = AppointmentService::create(
        &state,
        &actor,
        CreateAppointmentInput {
            professional_id: request.professional_id,
            service_id: request.service_id,
            start: request.start,
            location: request.location,
            notes: request.notes,
        },
    )
    .await?;

    Ok(Json(appointment))
}

async fn list_appointments(
    State(state): State<Arc<AppState>>,
    ActorContext(actor): ActorContext,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = AppointmentService::list_for_actor(&state, &actor).await?;
    Ok(Json(appointments))
}

async fn get_appointment(
    State(state): State<Arc<AppState>>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
) -> AppResult<Json<Appointment>> {
    let appointment = AppointmentService::get(&state, &actor, &id).await?;
    Ok(Json(appointment))
}

#[derive(Debug, Deserialize)]
struct RescheduleRequest {
    start: NaiveDateTime,
}

async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> AppResult<Json<Appointment>> {
    let appointment =
        AppointmentService::reschedule(&state, &actor, &id, request.start).await?;
    Ok(Json(appointment))
}

#[derive(Debug, Deserialize)]
struct ChangeStatusRequest {
    status: AppointmentStatus,
}

async fn change_status(
    State(state): State<Arc<AppState>>,
    ActorContext(actor): ActorContext,
    Path(id): Path<String>,
    Json(request): Json<ChangeStatusRequest>,
) -> AppResult<Json<Appointment>> {
    let appointment =
        AppointmentService::change_status(&state, &actor, &id, request.status).await?;
    Ok(Json(appointment))
}

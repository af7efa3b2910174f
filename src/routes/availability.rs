use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::scheduling::SlotResult;
use crate::services::appointments::AppointmentService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/:id/availability", get(get_availability))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    /// Day to enumerate, "YYYY-MM-DD".
    date: NaiveDate,
    /// Service whose duration sizes the slots.
    service_id: String,
}

/// Free/occupied slots for a professional's day. Public: browsing a
/// calendar requires no actor identity, only booking does.
async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(professional_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<SlotResult>>> {
    let slots =
        AppointmentService::availability(&state, &professional_id, &query.service_id, query.date)
            .await?;
    Ok(Json(slots))
}

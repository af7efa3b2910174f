use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::scheduling::{AppointmentStatus, Interval};

/// A booked appointment between a client and a professional.
///
/// `start_time` is a single normalized instant; the end is always derived
/// from `start_time + duration_minutes` and never stored on its own.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub professional_id: String,
    pub service_id: String,
    pub start_time: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn scheduled_end(&self) -> NaiveDateTime {
        self.start_time + Duration::minutes(self.duration_minutes)
    }

    pub fn interval(&self) -> Interval {
        Interval::from_start(self.start_time, self.duration_minutes)
    }
}

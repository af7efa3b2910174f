use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A service a professional offers, with the duration the scheduler
/// books for it. The catalog guarantees durations are positive.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProfessionalService {
    pub id: String,
    pub professional_id: String,
    pub name: String,
    pub duration_minutes: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

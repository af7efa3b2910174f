use sqlx::SqlitePool;

use crate::db::models::ProfessionalService;
use crate::error::{AppError, AppResult};

/// Repository for the `professional_services` catalog table.
pub struct ServiceRepository;

impl ServiceRepository {
    pub async fn find_active(
        pool: &SqlitePool,
        service_id: &str,
        professional_id: &str,
    ) -> AppResult<Option<ProfessionalService>> {
        sqlx::query_as::<_, ProfessionalService>(
            r#"
            SELECT id, professional_id, name, duration_minutes, active, created_at, updated_at
            FROM professional_services
            WHERE id = ?1 AND professional_id = ?2 AND active = TRUE
            "#,
        )
        .bind(service_id)
        .bind(professional_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)
    }

    /// Whether any catalog entry exists for the professional at all.
    /// Distinguishes "unknown professional" from "unknown service".
    pub async fn professional_exists(pool: &SqlitePool, professional_id: &str) -> AppResult<bool> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM professional_services WHERE professional_id = ?1",
        )
        .bind(professional_id)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count.0 > 0)
    }
}

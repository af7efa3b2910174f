use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::scheduling::SchedulingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Map each scheduling error kind to a status and a stable machine
/// readable code. Every rule violation keeps its own code so the
/// dashboard can render a precise message instead of a generic failure.
fn scheduling_response(err: &SchedulingError) -> (StatusCode, &'static str) {
    match err {
        SchedulingError::InvalidPastSchedule => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PAST_SCHEDULE")
        }
        SchedulingError::HorizonExceeded(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "HORIZON_EXCEEDED")
        }
        SchedulingError::OutsideBusinessHours => {
            (StatusCode::UNPROCESSABLE_ENTITY, "OUTSIDE_BUSINESS_HOURS")
        }
        SchedulingError::WeekendNotAllowed => {
            (StatusCode::UNPROCESSABLE_ENTITY, "WEEKEND_NOT_ALLOWED")
        }
        SchedulingError::InsufficientEditLeadTime(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_EDIT_LEAD_TIME",
        ),
        SchedulingError::InsufficientCancelLeadTime(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_CANCEL_LEAD_TIME",
        ),
        SchedulingError::SlotConflict => (StatusCode::CONFLICT, "SLOT_CONFLICT"),
        SchedulingError::InvalidStatusTransition { .. } => {
            (StatusCode::CONFLICT, "INVALID_STATUS_TRANSITION")
        }
        SchedulingError::NotAuthorizedForTransition => {
            (StatusCode::FORBIDDEN, "NOT_AUTHORIZED_FOR_TRANSITION")
        }
        SchedulingError::AppointmentStillFuture => {
            (StatusCode::UNPROCESSABLE_ENTITY, "APPOINTMENT_STILL_FUTURE")
        }
        SchedulingError::ServiceNotFound => (StatusCode::NOT_FOUND, "SERVICE_NOT_FOUND"),
        SchedulingError::ProfessionalNotFound => {
            (StatusCode::NOT_FOUND, "PROFESSIONAL_NOT_FOUND")
        }
        SchedulingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Scheduling(err) => {
                let (status, code) = scheduling_response(err);
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Scheduling storage error: {:?}", err);
                    (status, code, "An internal error occurred".to_string())
                } else {
                    (status, code, err.to_string())
                }
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_scheduling_kind_keeps_its_own_code() {
        let cases = [
            (
                SchedulingError::InvalidPastSchedule,
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_PAST_SCHEDULE",
            ),
            (
                SchedulingError::SlotConflict,
                StatusCode::CONFLICT,
                "SLOT_CONFLICT",
            ),
            (
                SchedulingError::NotAuthorizedForTransition,
                StatusCode::FORBIDDEN,
                "NOT_AUTHORIZED_FOR_TRANSITION",
            ),
            (
                SchedulingError::ServiceNotFound,
                StatusCode::NOT_FOUND,
                "SERVICE_NOT_FOUND",
            ),
        ];

        for (err, status, code) in cases {
            let (got_status, got_code) = scheduling_response(&err);
            assert_eq!(got_status, status);
            assert_eq!(got_code, code);
        }
    }
}

use super::status::AppointmentStatus;

/// Every way a scheduling decision can go against the caller, one variant
/// per violated rule so callers can render a precise message instead of a
/// generic failure.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("appointment start must be in the future")]
    InvalidPastSchedule,

    #[error("appointment start exceeds the {0}-month booking horizon")]
    HorizonExceeded(u32),

    #[error("requested time falls outside business hours")]
    OutsideBusinessHours,

    #[error("appointments cannot be scheduled on weekends")]
    WeekendNotAllowed,

    #[error("appointments can only be rescheduled at least {0} hours in advance")]
    InsufficientEditLeadTime(i64),

    #[error("appointments can only be cancelled at least {0} hours in advance")]
    InsufficientCancelLeadTime(i64),

    #[error("the requested time slot is already booked")]
    SlotConflict,

    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("actor is not authorized to perform this transition")]
    NotAuthorizedForTransition,

    #[error("appointment has not finished yet and cannot be completed")]
    AppointmentStillFuture,

    #[error("service not found")]
    ServiceNotFound,

    #[error("professional not found")]
    ProfessionalNotFound,

    #[error("calendar storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

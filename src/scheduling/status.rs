use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::SchedulingError;
use crate::db::models::Appointment;

/// Appointment lifecycle states.
///
/// REJECTED is the professional declining a PENDING request; CANCELLED is
/// either party withdrawing a PENDING or ACCEPTED appointment before it
/// occurs. Both are kept distinct because they carry different guards and
/// mean different things to the other party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// States that occupy a time slot and must be conflict-checked.
    pub fn holds_calendar(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Accepted)
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Rejected | AppointmentStatus::Cancelled | AppointmentStatus::Completed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Accepted => "accepted",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Professional,
}

/// The identity performing a transition. The role is an explicit guard
/// parameter rather than something read off ambient auth state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn is_professional_of(&self, appointment: &Appointment) -> bool {
        self.role == ActorRole::Professional && self.id == appointment.professional_id
    }

    pub fn is_client_of(&self, appointment: &Appointment) -> bool {
        self.role == ActorRole::Client && self.id == appointment.client_id
    }

    pub fn is_participant_of(&self, appointment: &Appointment) -> bool {
        self.is_professional_of(appointment) || self.is_client_of(appointment)
    }
}

/// Validate a requested status transition against the lifecycle machine.
///
/// | from     | to        | guard                                       |
/// |----------|-----------|---------------------------------------------|
/// | PENDING  | ACCEPTED  | actor is the professional                   |
/// | PENDING  | REJECTED  | actor is the professional                   |
/// | PENDING  | CANCELLED | actor is a participant                      |
/// | ACCEPTED | COMPLETED | actor is the professional, end <= now       |
/// | ACCEPTED | CANCELLED | actor is a participant                      |
/// | terminal | —         | no transition permitted                     |
///
/// The cancel lead-time policy is applied by the engine on top of this;
/// the machine only covers state and actor legality plus the temporal
/// guard on completion.
pub fn validate_transition(
    appointment: &Appointment,
    target: AppointmentStatus,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<(), SchedulingError> {
    let from = appointment.status;

    let invalid = || SchedulingError::InvalidStatusTransition { from, to: target };

    if from.is_terminal() {
        return Err(invalid());
    }

    match (from, target) {
        (AppointmentStatus::Pending, AppointmentStatus::Accepted)
        | (AppointmentStatus::Pending, AppointmentStatus::Rejected) => {
            if !actor.is_professional_of(appointment) {
                return Err(SchedulingError::NotAuthorizedForTransition);
            }
            Ok(())
        }
        (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
        | (AppointmentStatus::Accepted, AppointmentStatus::Cancelled) => {
            if !actor.is_participant_of(appointment) {
                return Err(SchedulingError::NotAuthorizedForTransition);
            }
            Ok(())
        }
        (AppointmentStatus::Accepted, AppointmentStatus::Completed) => {
            if !actor.is_professional_of(appointment) {
                return Err(SchedulingError::NotAuthorizedForTransition);
            }
            if appointment.scheduled_end() > now {
                return Err(SchedulingError::AppointmentStillFuture);
            }
            Ok(())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn appointment(status: AppointmentStatus, start: NaiveDateTime) -> Appointment {
        Appointment {
            id: "appt-1".to_string(),
            client_id: "client-1".to_string(),
            professional_id: "pro-1".to_string(),
            service_id: "svc-1".to_string(),
            start_time: start,
            duration_minutes: 60,
            status,
            location: None,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn professional() -> Actor {
        Actor {
            id: "pro-1".to_string(),
            role: ActorRole::Professional,
        }
    }

    fn client() -> Actor {
        Actor {
            id: "client-1".to_string(),
            role: ActorRole::Client,
        }
    }

    fn stranger() -> Actor {
        Actor {
            id: "someone-else".to_string(),
            role: ActorRole::Client,
        }
    }

    #[test]
    fn professional_accepts_pending() {
        let appt = appointment(AppointmentStatus::Pending, instant(15, 14));
        let now = instant(10, 9);
        assert!(validate_transition(&appt, AppointmentStatus::Accepted, &professional(), now).is_ok());
    }

    #[test]
    fn client_cannot_accept_or_reject() {
        let appt = appointment(AppointmentStatus::Pending, instant(15, 14));
        let now = instant(10, 9);
        for target in [AppointmentStatus::Accepted, AppointmentStatus::Rejected] {
            let err = validate_transition(&appt, target, &client(), now).unwrap_err();
            assert!(matches!(err, SchedulingError::NotAuthorizedForTransition));
        }
    }

    #[test]
    fn either_participant_can_cancel() {
        let now = instant(10, 9);
        for status in [AppointmentStatus::Pending, AppointmentStatus::Accepted] {
            let appt = appointment(status, instant(15, 14));
            assert!(validate_transition(&appt, AppointmentStatus::Cancelled, &client(), now).is_ok());
            assert!(
                validate_transition(&appt, AppointmentStatus::Cancelled, &professional(), now)
                    .is_ok()
            );
        }
    }

    #[test]
    fn stranger_cannot_cancel() {
        let appt = appointment(AppointmentStatus::Accepted, instant(15, 14));
        let err = validate_transition(&appt, AppointmentStatus::Cancelled, &stranger(), instant(10, 9))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotAuthorizedForTransition));
    }

    #[test]
    fn completing_a_finished_appointment_succeeds() {
        // Ends 15:00 on the 15th; now is later the same day.
        let appt = appointment(AppointmentStatus::Accepted, instant(15, 14));
        let now = instant(15, 16);
        assert!(validate_transition(&appt, AppointmentStatus::Completed, &professional(), now).is_ok());
    }

    #[test]
    fn completing_a_future_appointment_fails() {
        let appt = appointment(AppointmentStatus::Accepted, instant(15, 14));
        let now = instant(15, 13);
        let err = validate_transition(&appt, AppointmentStatus::Completed, &professional(), now)
            .unwrap_err();
        assert!(matches!(err, SchedulingError::AppointmentStillFuture));
    }

    #[test]
    fn completion_exactly_at_end_succeeds() {
        let appt = appointment(AppointmentStatus::Accepted, instant(15, 14));
        // scheduled_end == now is allowed: the appointment is over.
        let now = instant(15, 15);
        assert!(validate_transition(&appt, AppointmentStatus::Completed, &professional(), now).is_ok());
    }

    #[test]
    fn pending_cannot_be_completed() {
        let appt = appointment(AppointmentStatus::Pending, instant(10, 9));
        let err = validate_transition(&appt, AppointmentStatus::Completed, &professional(), instant(15, 9))
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::InvalidStatusTransition {
                from: AppointmentStatus::Pending,
                to: AppointmentStatus::Completed
            }
        ));
    }

    #[test]
    fn terminal_states_accept_no_transition() {
        let now = instant(20, 9);
        let targets = [
            AppointmentStatus::Pending,
            AppointmentStatus::Accepted,
            AppointmentStatus::Rejected,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ];
        for terminal in [
            AppointmentStatus::Rejected,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            let appt = appointment(terminal, instant(15, 14));
            for target in targets {
                for actor in [professional(), client(), stranger()] {
                    let err = validate_transition(&appt, target, &actor, now).unwrap_err();
                    assert!(
                        matches!(err, SchedulingError::InvalidStatusTransition { .. }),
                        "expected terminal closure for {terminal} -> {target}"
                    );
                }
            }
        }
    }

    #[test]
    fn accepted_cannot_go_back_to_pending() {
        let appt = appointment(AppointmentStatus::Accepted, instant(15, 14));
        let err = validate_transition(&appt, AppointmentStatus::Pending, &professional(), instant(10, 9))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidStatusTransition { .. }));
    }
}

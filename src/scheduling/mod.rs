//! Scheduling and conflict engine.
//!
//! Everything that decides what a professional's calendar looks like
//! lives here: interval overlap arithmetic, slot enumeration, temporal
//! business rules, the status lifecycle machine and the engine facade
//! that composes them. The modules are pure; all I/O goes through the
//! collaborator traits injected into [`engine::SchedulingEngine`].

pub mod clock;
pub mod engine;
pub mod error;
pub mod interval;
pub mod rules;
pub mod slots;
pub mod status;

pub use clock::{Clock, SystemClock};
pub use engine::{BookingRequest, BusyInterval, CalendarStore, SchedulingEngine, ServiceResolver};
pub use error::SchedulingError;
pub use interval::Interval;
pub use rules::SchedulingPolicy;
pub use slots::{SlotResult, SlotUnavailableReason};
pub use status::{Actor, ActorRole, AppointmentStatus};

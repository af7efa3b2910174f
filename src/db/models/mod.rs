//! Database row models, one file per table.

pub mod appointment;
pub mod service;

pub use self::appointment::Appointment;
pub use self::service::ProfessionalService;

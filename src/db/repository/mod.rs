pub mod appointment;
pub mod service;

pub use appointment::AppointmentRepository;
pub use service::ServiceRepository;

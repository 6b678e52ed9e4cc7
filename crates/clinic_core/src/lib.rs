pub mod domain;
pub mod ports;

pub use domain::{
    Appointment, AppointmentDetail, AppointmentPatch, AppointmentStatus, Availability, Doctor,
    DoctorSummary, MedicalRecordEntry, NewAppointment, NewAvailability, NewUser, Patient,
    ProfileUpdate, Role, Specialization, User,
};
pub use ports::{ClinicRepository, PortError, PortResult};

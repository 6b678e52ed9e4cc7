//! crates/clinic_core/src/ports.rs
//!
//! Defines the service contract (trait) for the application's storage.
//! The trait forms the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete database implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Appointment, AppointmentDetail, AppointmentPatch, Availability, Doctor, DoctorSummary,
    MedicalRecordEntry, NewAppointment, NewAvailability, NewUser, Patient, ProfileUpdate, Role,
    Specialization, User,
};

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness rule was violated (duplicate email, duplicate license).
    #[error("{0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The storage port. One implementation talks to PostgreSQL; tests use an
/// in-memory fake.
#[async_trait]
pub trait ClinicRepository: Send + Sync {
    // --- Users ---

    /// Creates the user row and its role profile (plus a lazily-created
    /// specialization for doctors) in a single transaction. Fails with
    /// `Conflict` on a duplicate email or license number.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>>;

    async fn user_by_id(&self, id: Uuid) -> PortResult<Option<User>>;

    async fn update_user_password(&self, id: Uuid, hashed_password: &str) -> PortResult<()>;

    /// Applies the present fields of `update` to the user row and its
    /// role profile. Fields that don't apply to `role` are ignored.
    async fn update_profile(
        &self,
        user_id: Uuid,
        role: Role,
        update: ProfileUpdate,
    ) -> PortResult<()>;

    // --- Role profiles ---

    async fn patient_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Patient>>;

    async fn doctor_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Doctor>>;

    async fn specialization_by_id(&self, id: i64) -> PortResult<Option<Specialization>>;

    // --- Doctor directory ---

    async fn doctor_summary_by_id(&self, doctor_id: Uuid) -> PortResult<Option<DoctorSummary>>;

    /// Case-insensitive substring search. A name filter matches first OR
    /// last name; both filters combine with AND.
    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialization: Option<&str>,
    ) -> PortResult<Vec<DoctorSummary>>;

    // --- Appointments ---

    async fn create_appointment(&self, new: NewAppointment) -> PortResult<AppointmentDetail>;

    /// Ordered by date descending, then time descending.
    async fn appointments_for_patient(&self, patient_id: Uuid)
        -> PortResult<Vec<AppointmentDetail>>;

    /// Ordered by date descending, then time descending.
    async fn appointments_for_doctor(&self, doctor_id: Uuid)
        -> PortResult<Vec<AppointmentDetail>>;

    async fn appointment_by_id(&self, id: i64) -> PortResult<Option<Appointment>>;

    /// Applies the present fields of `patch` and refreshes `updated_at`.
    async fn update_appointment(
        &self,
        id: i64,
        patch: AppointmentPatch,
    ) -> PortResult<AppointmentDetail>;

    // --- Availability ---

    /// Ordered by day_of_week lexically.
    async fn availability_for_doctor(&self, doctor_id: Uuid) -> PortResult<Vec<Availability>>;

    async fn create_availability(&self, new: NewAvailability) -> PortResult<Availability>;

    /// Deletes the slot only when it belongs to `doctor_id`. Returns
    /// whether a row was removed; absent and not-owned are
    /// indistinguishable on purpose.
    async fn delete_availability(&self, id: i64, doctor_id: Uuid) -> PortResult<bool>;

    // --- Medical records ---

    /// Ordered by record date descending.
    async fn medical_records_for_patient(
        &self,
        patient_id: Uuid,
    ) -> PortResult<Vec<MedicalRecordEntry>>;
}

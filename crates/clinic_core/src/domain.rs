//! crates/clinic_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format,
//! except for the two closed enums (`Role`, `AppointmentStatus`) which
//! carry serde derives because they travel inside signed tokens and
//! request bodies.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The two account roles. Every role-conditioned decision in the system
/// dispatches over this closed set rather than comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// The lifecycle states of an appointment.
///
/// The status column is constrained to these four values; parsing is
/// case-insensitive and unknown strings are rejected at the boundary.
/// There is deliberately no transition table: either owner of an
/// appointment may set any of the four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

/// An identity record. Owns at most one `Patient` or one `Doctor`
/// profile, exclusive by role.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Profile owned by a `User` with role `patient`.
#[derive(Debug, Clone)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile owned by a `User` with role `doctor`. The license number is
/// globally unique and required.
#[derive(Debug, Clone)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization_id: Option<i64>,
    pub license_number: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named specialty category. Created lazily the first time a doctor
/// registers with a name not yet present (matched case-insensitively).
#[derive(Debug, Clone)]
pub struct Specialization {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A doctor as shown in the public directory: profile fields joined with
/// the owning user's name and the specialization's display name.
#[derive(Debug, Clone)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: Option<String>,
    pub license_number: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// A weekly recurring time window owned by one doctor.
/// Invariant: `start_time` strictly precedes `end_time`.
#[derive(Debug, Clone)]
pub struct Availability {
    pub id: i64,
    pub doctor_id: Uuid,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// An appointment joined with the display names of both parties, as
/// returned by every read path.
#[derive(Debug, Clone)]
pub struct AppointmentDetail {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub patient_name: String,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

/// The ownership view of an appointment, used for authorization checks.
#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A medical record annotated with the treating doctor's display name.
#[derive(Debug, Clone)]
pub struct MedicalRecordEntry {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: Option<i64>,
    pub title: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub doctor_name: String,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to register a user and its role profile in one
/// transaction. `license_number` and `specialization` only apply to
/// doctors.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
}

/// Partial profile update. `None` means "field omitted from the
/// request"; a present value (including an empty string) is applied.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<String>,
    pub bio: Option<String>,
    pub consultation_fee: Option<f64>,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
}

/// Partial appointment update with presence semantics: `None` leaves the
/// field untouched, `Some` overwrites it even when the value is empty.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAvailability {
    pub doctor_id: Uuid,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

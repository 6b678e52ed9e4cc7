//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `ClinicRepository` port from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use clinic_core::domain::{
    Appointment, AppointmentDetail, AppointmentPatch, AppointmentStatus, Availability, Doctor,
    DoctorSummary, MedicalRecordEntry, NewAppointment, NewAvailability, NewUser, Patient,
    ProfileUpdate, Role, Specialization, User,
};
use clinic_core::ports::{ClinicRepository, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ClinicRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
    role: String,
    first_name: String,
    last_name: String,
    profile_picture: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
            role: Role::from_str(&self.role).map_err(PortError::Unexpected)?,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_picture: self.profile_picture,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct PatientRecord {
    id: Uuid,
    user_id: Uuid,
    date_of_birth: Option<NaiveDate>,
    phone: Option<String>,
    address: Option<String>,
    emergency_contact: Option<String>,
    blood_type: Option<String>,
    allergies: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PatientRecord {
    fn to_domain(self) -> Patient {
        Patient {
            id: self.id,
            user_id: self.user_id,
            date_of_birth: self.date_of_birth,
            phone: self.phone,
            address: self.address,
            emergency_contact: self.emergency_contact,
            blood_type: self.blood_type,
            allergies: self.allergies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct DoctorRecord {
    id: Uuid,
    user_id: Uuid,
    specialization_id: Option<i64>,
    license_number: String,
    bio: Option<String>,
    phone: Option<String>,
    consultation_fee: Option<f64>,
    years_of_experience: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DoctorRecord {
    fn to_domain(self) -> Doctor {
        Doctor {
            id: self.id,
            user_id: self.user_id,
            specialization_id: self.specialization_id,
            license_number: self.license_number,
            bio: self.bio,
            phone: self.phone,
            consultation_fee: self.consultation_fee,
            years_of_experience: self.years_of_experience,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct SpecializationRecord {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl SpecializationRecord {
    fn to_domain(self) -> Specialization {
        Specialization {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct DoctorSummaryRecord {
    id: Uuid,
    user_id: Uuid,
    specialization: Option<String>,
    license_number: String,
    bio: Option<String>,
    phone: Option<String>,
    consultation_fee: Option<f64>,
    years_of_experience: Option<i32>,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
}

impl DoctorSummaryRecord {
    fn to_domain(self) -> DoctorSummary {
        DoctorSummary {
            id: self.id,
            user_id: self.user_id,
            specialization: self.specialization,
            license_number: self.license_number,
            bio: self.bio,
            phone: self.phone,
            consultation_fee: self.consultation_fee,
            years_of_experience: self.years_of_experience,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AvailabilityRecord {
    id: i64,
    doctor_id: Uuid,
    day_of_week: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl AvailabilityRecord {
    fn to_domain(self) -> Availability {
        Availability {
            id: self.id,
            doctor_id: self.doctor_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            is_available: self.is_available,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AppointmentRecord {
    id: i64,
    patient_id: Uuid,
    doctor_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
    status: String,
    reason: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AppointmentRecord {
    fn to_domain(self) -> PortResult<Appointment> {
        Ok(Appointment {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: self.date,
            time: self.time,
            status: AppointmentStatus::from_str(&self.status).map_err(PortError::Unexpected)?,
            reason: self.reason,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AppointmentDetailRecord {
    id: i64,
    patient_id: Uuid,
    doctor_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
    status: String,
    reason: String,
    notes: Option<String>,
    patient_name: String,
    doctor_name: String,
    created_at: DateTime<Utc>,
}

impl AppointmentDetailRecord {
    fn to_domain(self) -> PortResult<AppointmentDetail> {
        Ok(AppointmentDetail {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: self.date,
            time: self.time,
            status: AppointmentStatus::from_str(&self.status).map_err(PortError::Unexpected)?,
            reason: self.reason,
            notes: self.notes,
            patient_name: self.patient_name,
            doctor_name: self.doctor_name,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct MedicalRecordRow {
    id: i64,
    patient_id: Uuid,
    doctor_id: Uuid,
    appointment_id: Option<i64>,
    title: String,
    diagnosis: String,
    treatment: String,
    prescription: Option<String>,
    notes: Option<String>,
    date: NaiveDate,
    doctor_name: String,
    created_at: DateTime<Utc>,
}

impl MedicalRecordRow {
    fn to_domain(self) -> MedicalRecordEntry {
        MedicalRecordEntry {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_id: self.appointment_id,
            title: self.title,
            diagnosis: self.diagnosis,
            treatment: self.treatment,
            prescription: self.prescription,
            notes: self.notes,
            date: self.date,
            doctor_name: self.doctor_name,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Shared Query Fragments
//=========================================================================================

const USER_COLUMNS: &str = "id, email, hashed_password, role, first_name, last_name, \
     profile_picture, is_active, created_at, updated_at";

const DOCTOR_SUMMARY_QUERY: &str = "SELECT d.id, d.user_id, s.name AS specialization, \
     d.license_number, d.bio, d.phone, d.consultation_fee, d.years_of_experience, \
     u.first_name, u.last_name, d.created_at \
     FROM doctors d \
     JOIN users u ON u.id = d.user_id \
     LEFT JOIN specializations s ON s.id = d.specialization_id";

const APPOINTMENT_DETAIL_QUERY: &str = "SELECT a.id, a.patient_id, a.doctor_id, a.date, a.time, \
     a.status, a.reason, a.notes, \
     pu.first_name || ' ' || pu.last_name AS patient_name, \
     du.first_name || ' ' || du.last_name AS doctor_name, \
     a.created_at \
     FROM appointments a \
     JOIN patients p ON p.id = a.patient_id \
     JOIN users pu ON pu.id = p.user_id \
     JOIN doctors d ON d.id = a.doctor_id \
     JOIN users du ON du.id = d.user_id";

/// Resolves a specialization by case-insensitive name, creating it on a
/// miss, inside the caller's transaction.
async fn get_or_create_specialization(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> PortResult<i64> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM specializations WHERE lower(name) = lower($1)")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await
            .map_err(unexpected)?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO specializations (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(format!("{name} specialist"))
    .fetch_one(&mut **tx)
    .await
    .map_err(unexpected)?;
    Ok(id)
}

//=========================================================================================
// `ClinicRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ClinicRepository for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let duplicate_email: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(&new_user.email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(unexpected)?;
        if duplicate_email.is_some() {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }

        if new_user.role == Role::Doctor {
            let duplicate_license: Option<(Uuid,)> =
                sqlx::query_as("SELECT id FROM doctors WHERE license_number = $1")
                    .bind(new_user.license_number.as_deref())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(unexpected)?;
            if duplicate_license.is_some() {
                return Err(PortError::Conflict(
                    "License number already registered".to_string(),
                ));
            }
        }

        let user_record: UserRecord = sqlx::query_as(&format!(
            "INSERT INTO users (email, hashed_password, role, first_name, last_name, is_active) \
             VALUES ($1, $2, $3, $4, $5, TRUE) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(new_user.role.as_str())
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(unexpected)?;

        match new_user.role {
            Role::Patient => {
                sqlx::query("INSERT INTO patients (user_id) VALUES ($1)")
                    .bind(user_record.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(unexpected)?;
            }
            Role::Doctor => {
                let specialization_id = match new_user.specialization.as_deref() {
                    Some(name) if !name.trim().is_empty() => {
                        Some(get_or_create_specialization(&mut tx, name).await?)
                    }
                    _ => None,
                };
                sqlx::query(
                    "INSERT INTO doctors (user_id, license_number, specialization_id) \
                     VALUES ($1, $2, $3)",
                )
                .bind(user_record.id)
                .bind(new_user.license_number.as_deref())
                .bind(specialization_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            }
        }

        tx.commit().await.map_err(unexpected)?;
        user_record.to_domain()
    }

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let record: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn user_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        let record: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        record.map(UserRecord::to_domain).transpose()
    }

    async fn update_user_password(&self, id: Uuid, hashed_password: &str) -> PortResult<()> {
        sqlx::query("UPDATE users SET hashed_password = $1, updated_at = now() WHERE id = $2")
            .bind(hashed_password)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        role: Role,
        update: ProfileUpdate,
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query(
            "UPDATE users SET first_name = COALESCE($1, first_name), \
             last_name = COALESCE($2, last_name), \
             profile_picture = COALESCE($3, profile_picture), \
             updated_at = now() WHERE id = $4",
        )
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.profile_picture.as_deref())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        match role {
            Role::Patient => {
                sqlx::query(
                    "UPDATE patients SET phone = COALESCE($1, phone), \
                     address = COALESCE($2, address), \
                     date_of_birth = COALESCE($3, date_of_birth), \
                     blood_type = COALESCE($4, blood_type), \
                     allergies = COALESCE($5, allergies), \
                     emergency_contact = COALESCE($6, emergency_contact), \
                     updated_at = now() WHERE user_id = $7",
                )
                .bind(update.phone.as_deref())
                .bind(update.address.as_deref())
                .bind(update.date_of_birth)
                .bind(update.blood_type.as_deref())
                .bind(update.allergies.as_deref())
                .bind(update.emergency_contact.as_deref())
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            }
            Role::Doctor => {
                sqlx::query(
                    "UPDATE doctors SET bio = COALESCE($1, bio), \
                     phone = COALESCE($2, phone), \
                     consultation_fee = COALESCE($3, consultation_fee), \
                     years_of_experience = COALESCE($4, years_of_experience), \
                     updated_at = now() WHERE user_id = $5",
                )
                .bind(update.bio.as_deref())
                .bind(update.phone.as_deref())
                .bind(update.consultation_fee)
                .bind(update.years_of_experience)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            }
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn patient_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Patient>> {
        let record: Option<PatientRecord> = sqlx::query_as(
            "SELECT id, user_id, date_of_birth, phone, address, emergency_contact, \
             blood_type, allergies, created_at, updated_at \
             FROM patients WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(PatientRecord::to_domain))
    }

    async fn doctor_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Doctor>> {
        let record: Option<DoctorRecord> = sqlx::query_as(
            "SELECT id, user_id, specialization_id, license_number, bio, phone, \
             consultation_fee, years_of_experience, created_at, updated_at \
             FROM doctors WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(DoctorRecord::to_domain))
    }

    async fn specialization_by_id(&self, id: i64) -> PortResult<Option<Specialization>> {
        let record: Option<SpecializationRecord> = sqlx::query_as(
            "SELECT id, name, description, created_at FROM specializations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(SpecializationRecord::to_domain))
    }

    async fn doctor_summary_by_id(&self, doctor_id: Uuid) -> PortResult<Option<DoctorSummary>> {
        let record: Option<DoctorSummaryRecord> =
            sqlx::query_as(&format!("{DOCTOR_SUMMARY_QUERY} WHERE d.id = $1"))
                .bind(doctor_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(record.map(DoctorSummaryRecord::to_domain))
    }

    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialization: Option<&str>,
    ) -> PortResult<Vec<DoctorSummary>> {
        let name_pattern = name.map(|n| format!("%{n}%"));
        let spec_pattern = specialization.map(|s| format!("%{s}%"));

        let records: Vec<DoctorSummaryRecord> = sqlx::query_as(&format!(
            "{DOCTOR_SUMMARY_QUERY} \
             WHERE ($1::text IS NULL OR u.first_name ILIKE $1 OR u.last_name ILIKE $1) \
             AND ($2::text IS NULL OR s.name ILIKE $2)"
        ))
        .bind(name_pattern)
        .bind(spec_pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(DoctorSummaryRecord::to_domain)
            .collect())
    }

    async fn create_appointment(&self, new: NewAppointment) -> PortResult<AppointmentDetail> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO appointments (patient_id, doctor_id, date, time, reason, status) \
             VALUES ($1, $2, $3, $4, $5, 'pending') RETURNING id",
        )
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(new.date)
        .bind(new.time)
        .bind(&new.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        self.appointment_detail(id).await
    }

    async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> PortResult<Vec<AppointmentDetail>> {
        let records: Vec<AppointmentDetailRecord> = sqlx::query_as(&format!(
            "{APPOINTMENT_DETAIL_QUERY} WHERE a.patient_id = $1 \
             ORDER BY a.date DESC, a.time DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(AppointmentDetailRecord::to_domain)
            .collect()
    }

    async fn appointments_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> PortResult<Vec<AppointmentDetail>> {
        let records: Vec<AppointmentDetailRecord> = sqlx::query_as(&format!(
            "{APPOINTMENT_DETAIL_QUERY} WHERE a.doctor_id = $1 \
             ORDER BY a.date DESC, a.time DESC"
        ))
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records
            .into_iter()
            .map(AppointmentDetailRecord::to_domain)
            .collect()
    }

    async fn appointment_by_id(&self, id: i64) -> PortResult<Option<Appointment>> {
        let record: Option<AppointmentRecord> = sqlx::query_as(
            "SELECT id, patient_id, doctor_id, date, time, status, reason, notes, \
             created_at, updated_at FROM appointments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(AppointmentRecord::to_domain).transpose()
    }

    async fn update_appointment(
        &self,
        id: i64,
        patch: AppointmentPatch,
    ) -> PortResult<AppointmentDetail> {
        let result = sqlx::query(
            "UPDATE appointments SET status = COALESCE($1, status), \
             notes = COALESCE($2, notes), updated_at = now() WHERE id = $3",
        )
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.notes.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Appointment not found".to_string()));
        }
        self.appointment_detail(id).await
    }

    async fn availability_for_doctor(&self, doctor_id: Uuid) -> PortResult<Vec<Availability>> {
        let records: Vec<AvailabilityRecord> = sqlx::query_as(
            "SELECT id, doctor_id, day_of_week, start_time, end_time, is_available, created_at \
             FROM availability WHERE doctor_id = $1 ORDER BY day_of_week",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records
            .into_iter()
            .map(AvailabilityRecord::to_domain)
            .collect())
    }

    async fn create_availability(&self, new: NewAvailability) -> PortResult<Availability> {
        let record: AvailabilityRecord = sqlx::query_as(
            "INSERT INTO availability (doctor_id, day_of_week, start_time, end_time, is_available) \
             VALUES ($1, $2, $3, $4, TRUE) \
             RETURNING id, doctor_id, day_of_week, start_time, end_time, is_available, created_at",
        )
        .bind(new.doctor_id)
        .bind(&new.day_of_week)
        .bind(new.start_time)
        .bind(new.end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_availability(&self, id: i64, doctor_id: Uuid) -> PortResult<bool> {
        // Scoping by doctor_id makes "absent" and "not owned" identical.
        let result = sqlx::query("DELETE FROM availability WHERE id = $1 AND doctor_id = $2")
            .bind(id)
            .bind(doctor_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn medical_records_for_patient(
        &self,
        patient_id: Uuid,
    ) -> PortResult<Vec<MedicalRecordEntry>> {
        let records: Vec<MedicalRecordRow> = sqlx::query_as(
            "SELECT m.id, m.patient_id, m.doctor_id, m.appointment_id, m.title, m.diagnosis, \
             m.treatment, m.prescription, m.notes, m.date, \
             u.first_name || ' ' || u.last_name AS doctor_name, m.created_at \
             FROM medical_records m \
             JOIN doctors d ON d.id = m.doctor_id \
             JOIN users u ON u.id = d.user_id \
             WHERE m.patient_id = $1 ORDER BY m.date DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(MedicalRecordRow::to_domain).collect())
    }
}

impl DbAdapter {
    /// Fetches the joined detail view of one appointment.
    async fn appointment_detail(&self, id: i64) -> PortResult<AppointmentDetail> {
        let record: AppointmentDetailRecord =
            sqlx::query_as(&format!("{APPOINTMENT_DETAIL_QUERY} WHERE a.id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("Appointment {id} not found"))
                    }
                    other => unexpected(other),
                })?;
        record.to_domain()
    }
}

//! services/api/tests/endpoints.rs
//!
//! End-to-end tests for the HTTP surface, driven through the real router
//! with an in-memory repository standing in for PostgreSQL.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use api_lib::auth::{issue_token, verify_token};
use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use clinic_core::domain::{
    Appointment, AppointmentDetail, AppointmentPatch, AppointmentStatus, Availability, Doctor,
    DoctorSummary, MedicalRecordEntry, NewAppointment, NewAvailability, NewUser, Patient,
    ProfileUpdate, Role, Specialization, User,
};
use clinic_core::ports::{ClinicRepository, PortError, PortResult};

const SECRET: &str = "test-secret";

//=========================================================================================
// In-memory repository fake
//=========================================================================================

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    specializations: Vec<Specialization>,
    availability: Vec<Availability>,
    appointments: Vec<Appointment>,
    medical_records: Vec<MedicalRecordEntry>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn full_name(&self, user_id: Uuid) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.full_name())
            .unwrap_or_default()
    }

    fn appointment_detail(&self, appointment: &Appointment) -> AppointmentDetail {
        let patient_user = self
            .patients
            .iter()
            .find(|p| p.id == appointment.patient_id)
            .map(|p| p.user_id);
        let doctor_user = self
            .doctors
            .iter()
            .find(|d| d.id == appointment.doctor_id)
            .map(|d| d.user_id);
        AppointmentDetail {
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            date: appointment.date,
            time: appointment.time,
            status: appointment.status,
            reason: appointment.reason.clone(),
            notes: appointment.notes.clone(),
            patient_name: patient_user.map(|u| self.full_name(u)).unwrap_or_default(),
            doctor_name: doctor_user.map(|u| self.full_name(u)).unwrap_or_default(),
            created_at: appointment.created_at,
        }
    }

    fn doctor_summary(&self, doctor: &Doctor) -> DoctorSummary {
        let user = self
            .users
            .iter()
            .find(|u| u.id == doctor.user_id)
            .expect("doctor user");
        DoctorSummary {
            id: doctor.id,
            user_id: doctor.user_id,
            specialization: doctor.specialization_id.and_then(|id| {
                self.specializations
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| s.name.clone())
            }),
            license_number: doctor.license_number.clone(),
            bio: doctor.bio.clone(),
            phone: doctor.phone.clone(),
            consultation_fee: doctor.consultation_fee,
            years_of_experience: doctor.years_of_experience,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: doctor.created_at,
        }
    }
}

#[derive(Default)]
struct MemoryRepository {
    inner: Mutex<Inner>,
}

impl MemoryRepository {
    fn deactivate(&self, email: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.email == email) {
            user.is_active = false;
        }
    }

    fn patient_id(&self, email: &str) -> Uuid {
        let inner = self.inner.lock().unwrap();
        let user = inner.users.iter().find(|u| u.email == email).unwrap();
        inner
            .patients
            .iter()
            .find(|p| p.user_id == user.id)
            .unwrap()
            .id
    }

    fn doctor_id(&self, email: &str) -> Uuid {
        let inner = self.inner.lock().unwrap();
        let user = inner.users.iter().find(|u| u.email == email).unwrap();
        inner
            .doctors
            .iter()
            .find(|d| d.user_id == user.id)
            .unwrap()
            .id
    }

    fn appointment_status(&self, id: i64) -> AppointmentStatus {
        let inner = self.inner.lock().unwrap();
        inner
            .appointments
            .iter()
            .find(|a| a.id == id)
            .unwrap()
            .status
    }

    fn insert_medical_record(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        title: &str,
        date: NaiveDate,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let doctor_user = inner
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .map(|d| d.user_id)
            .unwrap();
        let doctor_name = inner.full_name(doctor_user);
        inner.medical_records.push(MedicalRecordEntry {
            id,
            patient_id,
            doctor_id,
            appointment_id: None,
            title: title.to_string(),
            diagnosis: "diagnosis".to_string(),
            treatment: "treatment".to_string(),
            prescription: None,
            notes: None,
            date,
            doctor_name,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl ClinicRepository for MemoryRepository {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(PortError::Conflict("Email already registered".to_string()));
        }
        if new_user.role == Role::Doctor
            && inner
                .doctors
                .iter()
                .any(|d| Some(d.license_number.as_str()) == new_user.license_number.as_deref())
        {
            return Err(PortError::Conflict(
                "License number already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            hashed_password: new_user.hashed_password,
            role: new_user.role,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            profile_picture: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        match new_user.role {
            Role::Patient => inner.patients.push(Patient {
                id: Uuid::new_v4(),
                user_id: user.id,
                date_of_birth: None,
                phone: None,
                address: None,
                emergency_contact: None,
                blood_type: None,
                allergies: None,
                created_at: now,
                updated_at: now,
            }),
            Role::Doctor => {
                let specialization_id = match new_user.specialization.as_deref() {
                    Some(name) if !name.trim().is_empty() => {
                        let existing = inner
                            .specializations
                            .iter()
                            .find(|s| s.name.eq_ignore_ascii_case(name))
                            .map(|s| s.id);
                        Some(match existing {
                            Some(id) => id,
                            None => {
                                let id = inner.next_id();
                                inner.specializations.push(Specialization {
                                    id,
                                    name: name.to_string(),
                                    description: Some(format!("{name} specialist")),
                                    created_at: now,
                                });
                                id
                            }
                        })
                    }
                    _ => None,
                };
                inner.doctors.push(Doctor {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    specialization_id,
                    license_number: new_user.license_number.unwrap_or_default(),
                    bio: None,
                    phone: None,
                    consultation_fee: None,
                    years_of_experience: None,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        inner.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_id(&self, id: Uuid) -> PortResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_user_password(&self, id: Uuid, hashed_password: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == id) {
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        role: Role,
        update: ProfileUpdate,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            if let Some(v) = update.first_name {
                user.first_name = v;
            }
            if let Some(v) = update.last_name {
                user.last_name = v;
            }
            if let Some(v) = update.profile_picture {
                user.profile_picture = Some(v);
            }
            user.updated_at = Utc::now();
        }
        match role {
            Role::Patient => {
                if let Some(patient) = inner.patients.iter_mut().find(|p| p.user_id == user_id) {
                    if let Some(v) = update.phone {
                        patient.phone = Some(v);
                    }
                    if let Some(v) = update.address {
                        patient.address = Some(v);
                    }
                    if let Some(v) = update.date_of_birth {
                        patient.date_of_birth = Some(v);
                    }
                    if let Some(v) = update.blood_type {
                        patient.blood_type = Some(v);
                    }
                    if let Some(v) = update.allergies {
                        patient.allergies = Some(v);
                    }
                    if let Some(v) = update.emergency_contact {
                        patient.emergency_contact = Some(v);
                    }
                }
            }
            Role::Doctor => {
                if let Some(doctor) = inner.doctors.iter_mut().find(|d| d.user_id == user_id) {
                    if let Some(v) = update.bio {
                        doctor.bio = Some(v);
                    }
                    if let Some(v) = update.phone {
                        doctor.phone = Some(v);
                    }
                    if let Some(v) = update.consultation_fee {
                        doctor.consultation_fee = Some(v);
                    }
                    if let Some(v) = update.years_of_experience {
                        doctor.years_of_experience = Some(v);
                    }
                }
            }
        }
        Ok(())
    }

    async fn patient_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Patient>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.patients.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn doctor_by_user_id(&self, user_id: Uuid) -> PortResult<Option<Doctor>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.doctors.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn specialization_by_id(&self, id: i64) -> PortResult<Option<Specialization>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.specializations.iter().find(|s| s.id == id).cloned())
    }

    async fn doctor_summary_by_id(&self, doctor_id: Uuid) -> PortResult<Option<DoctorSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .map(|d| inner.doctor_summary(d)))
    }

    async fn search_doctors(
        &self,
        name: Option<&str>,
        specialization: Option<&str>,
    ) -> PortResult<Vec<DoctorSummary>> {
        let inner = self.inner.lock().unwrap();
        let matches = |summary: &DoctorSummary| {
            let name_ok = name.map_or(true, |n| {
                let n = n.to_lowercase();
                summary.first_name.to_lowercase().contains(&n)
                    || summary.last_name.to_lowercase().contains(&n)
            });
            let spec_ok = specialization.map_or(true, |s| {
                summary
                    .specialization
                    .as_deref()
                    .is_some_and(|have| have.to_lowercase().contains(&s.to_lowercase()))
            });
            name_ok && spec_ok
        };
        Ok(inner
            .doctors
            .iter()
            .map(|d| inner.doctor_summary(d))
            .filter(matches)
            .collect())
    }

    async fn create_appointment(&self, new: NewAppointment) -> PortResult<AppointmentDetail> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let id = inner.next_id();
        let appointment = Appointment {
            id,
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            date: new.date,
            time: new.time,
            status: AppointmentStatus::Pending,
            reason: new.reason,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let detail = inner.appointment_detail(&appointment);
        inner.appointments.push(appointment);
        Ok(detail)
    }

    async fn appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> PortResult<Vec<AppointmentDetail>> {
        let inner = self.inner.lock().unwrap();
        let mut details: Vec<AppointmentDetail> = inner
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .map(|a| inner.appointment_detail(a))
            .collect();
        details.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(details)
    }

    async fn appointments_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> PortResult<Vec<AppointmentDetail>> {
        let inner = self.inner.lock().unwrap();
        let mut details: Vec<AppointmentDetail> = inner
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id)
            .map(|a| inner.appointment_detail(a))
            .collect();
        details.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
        Ok(details)
    }

    async fn appointment_by_id(&self, id: i64) -> PortResult<Option<Appointment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn update_appointment(
        &self,
        id: i64,
        patch: AppointmentPatch,
    ) -> PortResult<AppointmentDetail> {
        let mut inner = self.inner.lock().unwrap();
        let Some(index) = inner.appointments.iter().position(|a| a.id == id) else {
            return Err(PortError::NotFound("Appointment not found".to_string()));
        };
        {
            let appointment = &mut inner.appointments[index];
            if let Some(status) = patch.status {
                appointment.status = status;
            }
            if let Some(notes) = patch.notes {
                appointment.notes = Some(notes);
            }
            appointment.updated_at = Utc::now();
        }
        let appointment = inner.appointments[index].clone();
        Ok(inner.appointment_detail(&appointment))
    }

    async fn availability_for_doctor(&self, doctor_id: Uuid) -> PortResult<Vec<Availability>> {
        let inner = self.inner.lock().unwrap();
        let mut slots: Vec<Availability> = inner
            .availability
            .iter()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        slots.sort_by(|a, b| a.day_of_week.cmp(&b.day_of_week));
        Ok(slots)
    }

    async fn create_availability(&self, new: NewAvailability) -> PortResult<Availability> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let slot = Availability {
            id,
            doctor_id: new.doctor_id,
            day_of_week: new.day_of_week,
            start_time: new.start_time,
            end_time: new.end_time,
            is_available: true,
            created_at: Utc::now(),
        };
        inner.availability.push(slot.clone());
        Ok(slot)
    }

    async fn delete_availability(&self, id: i64, doctor_id: Uuid) -> PortResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.availability.len();
        inner
            .availability
            .retain(|s| !(s.id == id && s.doctor_id == doctor_id));
        Ok(inner.availability.len() < before)
    }

    async fn medical_records_for_patient(
        &self,
        patient_id: Uuid,
    ) -> PortResult<Vec<MedicalRecordEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<MedicalRecordEntry> = inner
            .medical_records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

//=========================================================================================
// Test harness helpers
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: String::new(),
        log_level: tracing::Level::INFO,
        secret_key: SECRET.to_string(),
        token_ttl_minutes: 60,
        cors_origins: Vec::new(),
    }
}

fn setup() -> (Router, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::default());
    let state = Arc::new(AppState {
        repo: repo.clone(),
        config: Arc::new(test_config()),
    });
    (build_router(state), repo)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register_patient(router: &Router, email: &str) {
    let (status, _) = send(
        router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({
                "email": email,
                "password": "pw123456",
                "first_name": "Pat",
                "last_name": "Example",
                "role": "patient",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn register_doctor(router: &Router, email: &str, license: &str, specialization: &str) {
    let (status, _) = send(
        router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({
                "email": email,
                "password": "pw123456",
                "first_name": "Doc",
                "last_name": "Example",
                "role": "doctor",
                "license_number": license,
                "specialization": specialization,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn login(router: &Router, email: &str) -> String {
    let form = format!("username={email}&password=pw123456");
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn book(router: &Router, token: &str, doctor_id: Uuid, date: &str, time: &str) -> i64 {
    let (status, body) = send(
        router,
        json_request(
            "POST",
            "/appointments",
            Some(token),
            &json!({
                "doctor_id": doctor_id,
                "date": date,
                "time": time,
                "reason": "checkup",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

//=========================================================================================
// Registration and login
//=========================================================================================

#[tokio::test]
async fn doctor_registration_without_license_fails() {
    let (router, _) = setup();
    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({
                "email": "d@x.com",
                "password": "pw123456",
                "first_name": "Doc",
                "last_name": "NoLicense",
                "role": "doctor",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "License number is required for doctors");
}

#[tokio::test]
async fn duplicate_email_and_license_are_rejected() {
    let (router, _) = setup();
    register_doctor(&router, "d@x.com", "L1", "Cardiology").await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({
                "email": "d@x.com",
                "password": "pw123456",
                "first_name": "Doc",
                "last_name": "Dup",
                "role": "doctor",
                "license_number": "L2",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/auth/register",
            None,
            &json!({
                "email": "other@x.com",
                "password": "pw123456",
                "first_name": "Doc",
                "last_name": "Dup",
                "role": "doctor",
                "license_number": "L1",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "License number already registered");
}

#[tokio::test]
async fn login_issues_token_with_matching_claims() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;

    let form = "username=a%40x.com&password=pw123456";
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["role"], "patient");

    let claims = verify_token(body["access_token"].as_str().unwrap(), SECRET).unwrap();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.role, Role::Patient);
    assert_eq!(
        claims.user_id,
        Uuid::from_str(body["user_id"].as_str().unwrap()).unwrap()
    );
}

#[tokio::test]
async fn login_with_wrong_password_fails_regardless_of_account_state() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;

    let attempt = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=a%40x.com&password={password}")))
            .unwrap()
    };

    let (status, _) = send(&router, attempt("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Deactivation doesn't change the answer for a wrong password.
    repo.deactivate("a@x.com");
    let (status, _) = send(&router, attempt("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The right password on an inactive account is a validation failure.
    let (status, body) = send(&router, attempt("pw123456")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Inactive user");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;

    let expired = issue_token("a@x.com", Uuid::new_v4(), Role::Patient, SECRET, -5).unwrap();
    let (status, body) = send(&router, get_request("/auth/me", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token has expired");
}

#[tokio::test]
async fn missing_and_malformed_tokens_are_rejected() {
    let (router, _) = setup();
    let (status, _) = send(&router, get_request("/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, get_request("/auth/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

//=========================================================================================
// Profile management
//=========================================================================================

#[tokio::test]
async fn profile_update_and_merged_read() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;
    let token = login(&router, "a@x.com").await;

    let (status, _) = send(
        &router,
        json_request(
            "PUT",
            "/auth/profile",
            Some(&token),
            &json!({
                "first_name": "Alice",
                "phone": "555-0101",
                "blood_type": "O+",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, get_request("/auth/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Alice");
    // Untouched fields are preserved by the partial update.
    assert_eq!(body["last_name"], "Example");
    assert_eq!(body["phone"], "555-0101");
    assert_eq!(body["blood_type"], "O+");
}

#[tokio::test]
async fn change_password_validates_current_and_length() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;
    let token = login(&router, "a@x.com").await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/auth/change-password",
            Some(&token),
            &json!({ "current_password": "nope", "new_password": "longenough" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Current password is incorrect");

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/auth/change-password",
            Some(&token),
            &json!({ "current_password": "pw123456", "new_password": "short" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/auth/change-password",
            Some(&token),
            &json!({ "current_password": "pw123456", "new_password": "pw654321" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

//=========================================================================================
// Appointments
//=========================================================================================

#[tokio::test]
async fn booking_requires_the_patient_role() {
    let (router, repo) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let doctor_token = login(&router, "b@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/appointments",
            Some(&doctor_token),
            &json!({
                "doctor_id": doctor_id,
                "date": "2025-06-01",
                "time": "09:00:00",
                "reason": "checkup",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn booking_with_unknown_doctor_is_not_found() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;
    let token = login(&router, "a@x.com").await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/appointments",
            Some(&token),
            &json!({
                "doctor_id": Uuid::new_v4(),
                "date": "2025-06-01",
                "time": "09:00:00",
                "reason": "checkup",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Doctor not found");
}

#[tokio::test]
async fn my_appointments_are_ordered_most_recent_first() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let token = login(&router, "a@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");

    book(&router, &token, doctor_id, "2025-06-01", "09:00:00").await;
    book(&router, &token, doctor_id, "2025-06-02", "08:00:00").await;
    book(&router, &token, doctor_id, "2025-06-01", "14:00:00").await;

    let (status, body) = send(&router, get_request("/appointments/my", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 3);
    let keys: Vec<(String, String)> = items
        .iter()
        .map(|a| {
            (
                a["date"].as_str().unwrap().to_string(),
                a["time"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(keys[0].0, "2025-06-02");
    assert_eq!((keys[1].0.as_str(), keys[1].1.as_str()), ("2025-06-01", "14:00:00"));
    assert_eq!((keys[2].0.as_str(), keys[2].1.as_str()), ("2025-06-01", "09:00:00"));
}

#[tokio::test]
async fn caller_without_profile_gets_an_empty_list() {
    let (router, _) = setup();
    // A syntactically valid token whose user has no role profile.
    let stray = issue_token("ghost@x.com", Uuid::new_v4(), Role::Patient, SECRET, 60).unwrap();
    let (status, body) = send(&router, get_request("/appointments/my", Some(&stray))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn third_party_status_update_is_forbidden_and_leaves_record_unchanged() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    register_patient(&router, "intruder@x.com").await;
    let patient_token = login(&router, "a@x.com").await;
    let intruder_token = login(&router, "intruder@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");

    let appointment_id = book(&router, &patient_token, doctor_id, "2025-06-01", "09:00:00").await;

    let (status, _) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&intruder_token),
            &json!({ "status": "cancelled" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        repo.appointment_status(appointment_id),
        AppointmentStatus::Pending
    );
}

#[tokio::test]
async fn unknown_status_value_is_a_validation_error() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let token = login(&router, "a@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");
    let appointment_id = book(&router, &token, doctor_id, "2025-06-01", "09:00:00").await;

    let (status, _) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&token),
            &json!({ "status": "rescheduled" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn booking_without_a_patient_profile_is_not_found() {
    let (router, repo) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let doctor_id = repo.doctor_id("b@x.com");

    // A patient-role token whose user never got a profile row.
    let stray = issue_token("ghost@x.com", Uuid::new_v4(), Role::Patient, SECRET, 60).unwrap();
    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/appointments",
            Some(&stray),
            &json!({
                "doctor_id": doctor_id,
                "date": "2025-06-01",
                "time": "09:00:00",
                "reason": "checkup",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Patient profile not found");
}

#[tokio::test]
async fn supplied_empty_notes_are_applied_and_omitted_notes_are_kept() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let token = login(&router, "a@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");
    let appointment_id = book(&router, &token, doctor_id, "2025-06-01", "09:00:00").await;

    let (status, body) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&token),
            &json!({ "notes": "bring previous results" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "bring previous results");
    // A notes-only patch leaves the status alone.
    assert_eq!(body["status"], "pending");

    // Presence semantics: an empty string is a supplied value, not an
    // omission, and overwrites the stored notes.
    let (status, body) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&token),
            &json!({ "notes": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "");

    // And an omitted field is left unchanged.
    let (status, body) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&token),
            &json!({ "status": "cancelled" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["notes"], "");
}

#[tokio::test]
async fn patching_a_missing_appointment_is_not_found() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;
    let token = login(&router, "a@x.com").await;

    let (status, _) = send(
        &router,
        json_request(
            "PATCH",
            "/appointments/9999/status",
            Some(&token),
            &json!({ "status": "confirmed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// The end-to-end scenario: patient books, doctor sees it and confirms,
/// patient observes the new status.
#[tokio::test]
async fn booking_confirmation_round_trip() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let patient_token = login(&router, "a@x.com").await;
    let doctor_token = login(&router, "b@x.com").await;
    let doctor_id = repo.doctor_id("b@x.com");

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/appointments",
            Some(&patient_token),
            &json!({
                "doctor_id": doctor_id,
                "date": "2025-06-01",
                "time": "09:00:00",
                "reason": "checkup",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let appointment_id = body["id"].as_i64().unwrap();

    let (status, body) = send(&router, get_request("/appointments/my", Some(&doctor_token))).await;
    assert_eq!(status, StatusCode::OK);
    let mine = body.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["id"].as_i64().unwrap(), appointment_id);
    assert_eq!(mine[0]["reason"], "checkup");

    let (status, body) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/appointments/{appointment_id}/status"),
            Some(&doctor_token),
            &json!({ "status": "confirmed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = send(&router, get_request("/appointments/my", Some(&patient_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap()[0]["status"], "confirmed");
}

//=========================================================================================
// Availability
//=========================================================================================

#[tokio::test]
async fn availability_requires_start_before_end() {
    let (router, _) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let token = login(&router, "b@x.com").await;

    for (start, end) in [("09:00:00", "09:00:00"), ("10:00:00", "09:00:00")] {
        let (status, body) = send(
            &router,
            json_request(
                "POST",
                "/availability",
                Some(&token),
                &json!({ "day_of_week": "Monday", "start_time": start, "end_time": end }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Start time must be before end time");
    }

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/availability",
            Some(&token),
            &json!({ "day_of_week": "Monday", "start_time": "09:00:00", "end_time": "17:00:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["day_of_week"], "monday");
    assert_eq!(body["is_available"], true);
}

#[tokio::test]
async fn availability_is_doctor_only_and_listed_lexically() {
    let (router, _) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let patient_token = login(&router, "a@x.com").await;
    let doctor_token = login(&router, "b@x.com").await;

    let (status, _) = send(&router, get_request("/availability/my", Some(&patient_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for day in ["Wednesday", "Friday", "Monday"] {
        let (status, _) = send(
            &router,
            json_request(
                "POST",
                "/availability",
                Some(&doctor_token),
                &json!({ "day_of_week": day, "start_time": "09:00:00", "end_time": "12:00:00" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&router, get_request("/availability/my", Some(&doctor_token))).await;
    assert_eq!(status, StatusCode::OK);
    let days: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["day_of_week"].as_str().unwrap())
        .collect();
    // Lexical order, not calendar order.
    assert_eq!(days, vec!["friday", "monday", "wednesday"]);
}

#[tokio::test]
async fn deleting_anothers_slot_reports_not_found() {
    let (router, _) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    register_doctor(&router, "c@x.com", "L2", "Pediatrics").await;
    let owner_token = login(&router, "b@x.com").await;
    let other_token = login(&router, "c@x.com").await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/availability",
            Some(&owner_token),
            &json!({ "day_of_week": "Monday", "start_time": "09:00:00", "end_time": "12:00:00" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let slot_id = body["id"].as_i64().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/availability/{slot_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {other_token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner can still remove it.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/availability/{slot_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {owner_token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

//=========================================================================================
// Doctor directory
//=========================================================================================

#[tokio::test]
async fn doctor_search_filters_by_name_and_specialization() {
    let (router, repo) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    register_doctor(&router, "c@x.com", "L2", "Pediatrics").await;
    if let Some(user) = repo
        .inner
        .lock()
        .unwrap()
        .users
        .iter_mut()
        .find(|u| u.email == "c@x.com")
    {
        user.last_name = "Johnson".to_string();
    }

    let (status, body) = send(&router, get_request("/doctors/search", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &router,
        get_request("/doctors/search?specialization=cardio", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["specialization"], "Cardiology");

    let (status, body) = send(
        &router,
        get_request("/doctors/search?name=john&specialization=pedia", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &router,
        get_request("/doctors/search?name=john&specialization=cardio", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn doctor_lookup_by_id() {
    let (router, repo) = setup();
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let doctor_id = repo.doctor_id("b@x.com");

    let (status, body) = send(&router, get_request(&format!("/doctors/{doctor_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["license_number"], "L1");

    let (status, _) = send(
        &router,
        get_request(&format!("/doctors/{}", Uuid::new_v4()), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Medical records
//=========================================================================================

#[tokio::test]
async fn medical_records_are_patient_only_and_date_descending() {
    let (router, repo) = setup();
    register_patient(&router, "a@x.com").await;
    register_doctor(&router, "b@x.com", "L1", "Cardiology").await;
    let patient_token = login(&router, "a@x.com").await;
    let doctor_token = login(&router, "b@x.com").await;

    let (status, _) = send(
        &router,
        get_request("/medical-records/my", Some(&doctor_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let patient_id = repo.patient_id("a@x.com");
    let doctor_id = repo.doctor_id("b@x.com");
    repo.insert_medical_record(
        patient_id,
        doctor_id,
        "older",
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    );
    repo.insert_medical_record(
        patient_id,
        doctor_id,
        "newer",
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
    );

    let (status, body) = send(
        &router,
        get_request("/medical-records/my", Some(&patient_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "newer");
    assert_eq!(records[1]["title"], "older");
    assert_eq!(records[0]["doctor_name"], "Doc Example");
}

//=========================================================================================
// Liveness
//=========================================================================================

#[tokio::test]
async fn health_and_root_respond() {
    let (router, _) = setup();
    let (status, body) = send(&router, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&router, get_request("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to HealthCare API");
}

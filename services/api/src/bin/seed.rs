//! services/api/src/bin/seed.rs
//!
//! Loads a small set of sample accounts for local development. Skips
//! seeding when the database already holds users. Each account is created
//! through the same transactional path the API uses, so a failure rolls
//! back cleanly.

use api_lib::{
    adapters::DbAdapter,
    auth::hash_password,
    config::Config,
    error::ApiError,
};
use clinic_core::domain::{NewUser, ProfileUpdate, Role};
use clinic_core::ports::ClinicRepository;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;
    let repo = DbAdapter::new(db_pool.clone());
    repo.run_migrations().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&db_pool)
        .await?;
    if existing > 0 {
        info!("Database already has data. Skipping seed.");
        return Ok(());
    }

    info!("Starting database seeding...");
    if let Err(e) = seed(&repo).await {
        error!("Error seeding database: {}", e);
        return Err(e);
    }

    info!("Database seeding completed successfully!");
    info!("Test credentials:");
    info!("Patient - Email: john.doe@example.com, Password: patient123");
    info!("Doctor 1 - Email: dr.smith@example.com, Password: doctor123");
    info!("Doctor 2 - Email: dr.johnson@example.com, Password: doctor123");
    Ok(())
}

async fn seed(repo: &DbAdapter) -> Result<(), ApiError> {
    let patient_password = hash_password("patient123")
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))?;
    let doctor_password = hash_password("doctor123")
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))?;

    info!("Creating sample patient...");
    let patient = repo
        .create_user(NewUser {
            email: "john.doe@example.com".to_string(),
            hashed_password: patient_password,
            role: Role::Patient,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            license_number: None,
            specialization: None,
        })
        .await?;
    repo.update_profile(
        patient.id,
        Role::Patient,
        ProfileUpdate {
            phone: Some("555-0101".to_string()),
            blood_type: Some("O+".to_string()),
            allergies: Some("None".to_string()),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    info!("Creating sample doctors...");
    let cardiologist = repo
        .create_user(NewUser {
            email: "dr.smith@example.com".to_string(),
            hashed_password: doctor_password.clone(),
            role: Role::Doctor,
            first_name: "Sarah".to_string(),
            last_name: "Smith".to_string(),
            license_number: Some("MD123456".to_string()),
            specialization: Some("Cardiology".to_string()),
        })
        .await?;
    repo.update_profile(
        cardiologist.id,
        Role::Doctor,
        ProfileUpdate {
            bio: Some("Experienced cardiologist with 15 years of practice".to_string()),
            phone: Some("555-0201".to_string()),
            consultation_fee: Some(150.0),
            years_of_experience: Some(15),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    let pediatrician = repo
        .create_user(NewUser {
            email: "dr.johnson@example.com".to_string(),
            hashed_password: doctor_password,
            role: Role::Doctor,
            first_name: "Michael".to_string(),
            last_name: "Johnson".to_string(),
            license_number: Some("MD789012".to_string()),
            specialization: Some("Pediatrics".to_string()),
        })
        .await?;
    repo.update_profile(
        pediatrician.id,
        Role::Doctor,
        ProfileUpdate {
            bio: Some("Pediatric specialist caring for children of all ages".to_string()),
            phone: Some("555-0202".to_string()),
            consultation_fee: Some(120.0),
            years_of_experience: Some(10),
            ..ProfileUpdate::default()
        },
    )
    .await?;

    Ok(())
}

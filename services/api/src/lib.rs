pub mod adapters;
pub mod auth;
pub mod config;
pub mod error;
pub mod web;

pub use adapters::DbAdapter;
pub use config::Config;
pub use error::ApiError;
pub use web::build_router;

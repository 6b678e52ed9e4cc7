//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use clinic_core::ports::ClinicRepository;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Read-only after construction apart from what the repository
/// itself persists.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ClinicRepository>,
    pub config: Arc<Config>,
}

//! Core domain logic for the dog breed catalog.
//! This crate is the single source of truth for breed/sub-breed invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::breed::{display_name, BreedRecord, BreedRecordId, BreedValidationError};
pub use repo::breed_repo::{BreedRepository, RepoError, RepoResult, SqliteBreedRepository};
pub use service::catalog_service::{
    group_records, ActionOutcome, BreedGroup, CatalogService, EditDogRequest,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Repository layer for the breed catalog.
//!
//! # Responsibility
//! - Define the data access contract callers and services depend on.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Conflicts are reported as `Ok(false)`, never as errors.
//! - Storage failures surface as `RepoError::Db` after rollback.

pub mod breed_repo;

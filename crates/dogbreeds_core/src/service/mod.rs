//! Use-case services over the breed repository.
//!
//! # Responsibility
//! - Turn route-level requests into repository calls.
//! - Keep outer surfaces (CLI, future HTTP glue) decoupled from storage.

pub mod catalog_service;

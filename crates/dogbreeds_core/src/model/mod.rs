//! Domain model for the breed catalog.
//!
//! # Invariants
//! - Every row is identified by a storage-generated integer id.
//! - A breed without sub-breeds is represented by one placeholder row.

pub mod breed;

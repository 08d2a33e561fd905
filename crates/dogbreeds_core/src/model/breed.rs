//! Breed catalog domain model.
//!
//! # Responsibility
//! - Define the persisted `(breed, sub_breed)` record shape.
//! - Normalize and validate user-supplied names before storage access.
//!
//! # Invariants
//! - Stored names are trimmed, lowercase and non-empty.
//! - A record with `sub_breed == None` is the breed's placeholder; it only
//!   exists while the breed has no sub-breeds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-generated row identifier.
pub type BreedRecordId = i64;

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedRecord {
    /// Generated by storage; stable for the row's lifetime.
    pub id: BreedRecordId,
    /// Lowercase breed name.
    pub breed: String,
    /// Lowercase sub-breed name, `None` for the placeholder row.
    pub sub_breed: Option<String>,
}

impl BreedRecord {
    /// Returns whether this row stands in for a breed without sub-breeds.
    pub fn is_placeholder(&self) -> bool {
        self.sub_breed.is_none()
    }
}

/// Rejected input, raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreedValidationError {
    /// Breed name missing or blank.
    EmptyBreed,
    /// Sub-breed supplied but blank.
    EmptySubBreed,
    /// A sub-breed edit needs the replacement sub-breed name.
    MissingNewSubBreed,
    /// A breed-level rename cannot also set a sub-breed.
    UnexpectedNewSubBreed,
    /// Paired original/new sub-breed lists differ in length.
    MismatchedSubBreedLists { originals: usize, replacements: usize },
}

impl Display for BreedValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBreed => write!(f, "breed name is required"),
            Self::EmptySubBreed => write!(f, "sub-breed name cannot be empty"),
            Self::MissingNewSubBreed => write!(f, "new sub-breed name is required"),
            Self::UnexpectedNewSubBreed => {
                write!(f, "breed rename cannot set a sub-breed without an original sub-breed")
            }
            Self::MismatchedSubBreedLists {
                originals,
                replacements,
            } => write!(
                f,
                "expected matching sub-breed lists, got {originals} originals and {replacements} replacements"
            ),
        }
    }
}

impl Error for BreedValidationError {}

/// Trims and lowercases a name. Returns `None` when nothing is left.
pub fn normalize_name(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes a required breed name.
pub fn normalize_breed(value: &str) -> Result<String, BreedValidationError> {
    normalize_name(value).ok_or(BreedValidationError::EmptyBreed)
}

/// Normalizes a required sub-breed name.
pub fn normalize_sub_breed(value: &str) -> Result<String, BreedValidationError> {
    normalize_name(value).ok_or(BreedValidationError::EmptySubBreed)
}

/// Normalizes an optional sub-breed. `Some("")` is rejected, not coerced.
pub fn normalize_optional_sub_breed(
    value: Option<&str>,
) -> Result<Option<String>, BreedValidationError> {
    value.map(normalize_sub_breed).transpose()
}

/// Formats a stored name for display: first letter upper-cased.
pub fn display_name(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_trims_and_lowercases() {
        assert_eq!(normalize_name("  Labrador "), Some("labrador".to_string()));
        assert_eq!(normalize_name(" \t "), None);
    }

    #[test]
    fn optional_sub_breed_rejects_blank_but_keeps_absent() {
        assert_eq!(normalize_optional_sub_breed(None), Ok(None));
        assert_eq!(
            normalize_optional_sub_breed(Some("  ")),
            Err(BreedValidationError::EmptySubBreed)
        );
        assert_eq!(
            normalize_optional_sub_breed(Some("Golden")),
            Ok(Some("golden".to_string()))
        );
    }

    #[test]
    fn display_name_capitalizes_first_letter_only() {
        assert_eq!(display_name("german shepherd"), "German shepherd");
        assert_eq!(display_name(""), "");
    }
}

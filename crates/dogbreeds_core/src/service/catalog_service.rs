//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide one entry point per catalog route (list, add, delete, edit).
//! - Turn repository booleans and validation errors into user-facing outcomes.
//! - Group flat records into the breed → sub-breeds listing.
//!
//! # Invariants
//! - Validation and conflict results become `ActionOutcome { ok: false }`.
//! - Storage errors are returned unchanged; they are never folded into an
//!   outcome message.
//! - `edit_dog` stops at the first failed edit and reports it.

use crate::model::breed::{display_name, normalize_name, BreedRecord, BreedValidationError};
use crate::repo::breed_repo::{BreedRepository, RepoError, RepoResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// One breed with its sub-breeds, as shown on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreedGroup {
    pub breed: String,
    /// Empty when the breed only has its placeholder row.
    pub sub_breeds: Vec<String>,
}

/// Result envelope for mutating routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the mutation was applied.
    pub ok: bool,
    /// Flash message for the caller.
    pub message: String,
}

impl ActionOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Edit form payload: a breed rename plus paired sub-breed renames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDogRequest {
    pub original_breed: String,
    /// New breed name; equal to `original_breed` when only sub-breeds change.
    pub breed: String,
    pub original_sub_breeds: Vec<String>,
    /// Replacement names, index-aligned with `original_sub_breeds`.
    pub sub_breeds: Vec<String>,
}

/// Route-level facade over a breed repository.
pub struct CatalogService<R: BreedRepository> {
    repo: R,
}

impl<R: BreedRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the wrapped repository.
    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Lists breeds with their sub-breeds, sorted by breed name.
    pub fn list_grouped(&self) -> RepoResult<Vec<BreedGroup>> {
        Ok(group_records(self.repo.list_all()?))
    }

    /// Adds a breed, or a breed/sub-breed pair when `sub_breed` is non-blank.
    pub fn add_dog(&mut self, breed: &str, sub_breed: Option<&str>) -> RepoResult<ActionOutcome> {
        let sub_breed = sub_breed.filter(|value| !value.trim().is_empty());
        let result = self.repo.add(breed, sub_breed);
        match sub_breed {
            None => settle(
                result,
                || format!("Added breed {}", label(breed)),
                || format!("Breed {} already exists", label(breed)),
            ),
            Some(sub_breed) => settle(
                result,
                || format!("Added sub-breed {} to {}", label(sub_breed), label(breed)),
                || {
                    format!(
                        "Sub-breed {} already exists for {}",
                        label(sub_breed),
                        label(breed)
                    )
                },
            ),
        }
    }

    /// Attaches a sub-breed to a new or existing breed.
    pub fn add_sub_breed(&mut self, breed: &str, sub_breed: &str) -> RepoResult<ActionOutcome> {
        settle(
            self.repo.add_sub_breed(breed, sub_breed),
            || format!("Added sub-breed {} to {}", label(sub_breed), label(breed)),
            || {
                format!(
                    "Sub-breed {} already exists for {}",
                    label(sub_breed),
                    label(breed)
                )
            },
        )
    }

    /// Deletes a breed and all of its sub-breeds.
    pub fn delete_breed(&mut self, breed: &str) -> RepoResult<ActionOutcome> {
        settle(
            self.repo.delete(breed, None),
            || format!("Deleted breed {}", label(breed)),
            || format!("Breed {} not found", label(breed)),
        )
    }

    /// Deletes one sub-breed; the breed itself survives as a placeholder.
    pub fn delete_sub_breed(&mut self, breed: &str, sub_breed: &str) -> RepoResult<ActionOutcome> {
        settle(
            self.repo.delete(breed, Some(sub_breed)),
            || format!("Deleted sub-breed {} from {}", label(sub_breed), label(breed)),
            || {
                format!(
                    "Sub-breed {} not found for {}",
                    label(sub_breed),
                    label(breed)
                )
            },
        )
    }

    /// Applies an edit form: breed rename first, then each changed sub-breed pair.
    ///
    /// Edits already applied stay committed when a later pair fails.
    pub fn edit_dog(&mut self, request: &EditDogRequest) -> RepoResult<ActionOutcome> {
        let (Some(original_breed), Some(breed)) = (
            normalize_name(&request.original_breed),
            normalize_name(&request.breed),
        ) else {
            return Ok(ActionOutcome::failure(
                BreedValidationError::EmptyBreed.to_string(),
            ));
        };

        if request.original_sub_breeds.len() != request.sub_breeds.len() {
            return Ok(ActionOutcome::failure(
                BreedValidationError::MismatchedSubBreedLists {
                    originals: request.original_sub_breeds.len(),
                    replacements: request.sub_breeds.len(),
                }
                .to_string(),
            ));
        }

        let mut changed = false;
        if original_breed != breed {
            let outcome = settle(
                self.repo.edit(&original_breed, &breed, None, None),
                String::new,
                || {
                    format!(
                        "Could not rename {} to {}: breed already exists or was not found",
                        display_name(&original_breed),
                        display_name(&breed)
                    )
                },
            )?;
            if !outcome.ok {
                return Ok(outcome);
            }
            changed = true;
        }

        for (original_sub, new_sub) in request
            .original_sub_breeds
            .iter()
            .zip(request.sub_breeds.iter())
        {
            if normalize_name(original_sub) == normalize_name(new_sub) {
                continue;
            }
            let outcome = settle(
                self.repo
                    .edit(&breed, &breed, Some(original_sub), Some(new_sub)),
                String::new,
                || {
                    format!(
                        "Could not rename sub-breed {} to {} for {}",
                        label(original_sub),
                        label(new_sub),
                        display_name(&breed)
                    )
                },
            )?;
            if !outcome.ok {
                return Ok(outcome);
            }
            changed = true;
        }

        if changed {
            Ok(ActionOutcome::success(format!(
                "Updated breed {}",
                display_name(&breed)
            )))
        } else {
            Ok(ActionOutcome::success(format!(
                "No changes to {}",
                display_name(&breed)
            )))
        }
    }
}

/// Groups ordered records into one entry per breed.
///
/// Sub-breeds keep the order they arrive in; breeds are sorted by name.
pub fn group_records(records: Vec<BreedRecord>) -> Vec<BreedGroup> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        let sub_breeds = groups.entry(record.breed).or_default();
        if let Some(sub_breed) = record.sub_breed {
            sub_breeds.push(sub_breed);
        }
    }

    groups
        .into_iter()
        .map(|(breed, sub_breeds)| BreedGroup { breed, sub_breeds })
        .collect()
}

fn settle(
    result: RepoResult<bool>,
    applied: impl FnOnce() -> String,
    rejected: impl FnOnce() -> String,
) -> RepoResult<ActionOutcome> {
    match result {
        Ok(true) => Ok(ActionOutcome::success(applied())),
        Ok(false) => Ok(ActionOutcome::failure(rejected())),
        Err(RepoError::Validation(err)) => Ok(ActionOutcome::failure(err.to_string())),
        Err(err) => Err(err),
    }
}

fn label(value: &str) -> String {
    display_name(&normalize_name(value).unwrap_or_default())
}

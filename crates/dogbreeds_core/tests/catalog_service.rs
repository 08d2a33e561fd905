use dogbreeds_core::db::{open_db_in_memory, DbError};
use dogbreeds_core::{
    BreedGroup, BreedRecord, BreedRepository, CatalogService, EditDogRequest, RepoError,
    RepoResult, SqliteBreedRepository,
};
use std::cell::RefCell;

fn group(breed: &str, sub_breeds: &[&str]) -> BreedGroup {
    BreedGroup {
        breed: breed.to_string(),
        sub_breeds: sub_breeds.iter().map(|value| value.to_string()).collect(),
    }
}

fn edit_request(
    original_breed: &str,
    breed: &str,
    original_sub_breeds: &[&str],
    sub_breeds: &[&str],
) -> EditDogRequest {
    EditDogRequest {
        original_breed: original_breed.to_string(),
        breed: breed.to_string(),
        original_sub_breeds: original_sub_breeds.iter().map(|v| v.to_string()).collect(),
        sub_breeds: sub_breeds.iter().map(|v| v.to_string()).collect(),
    }
}

#[test]
fn listing_groups_sub_breeds_under_sorted_breeds() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("terrier", Some("yorkshire")).unwrap();
    service.add_dog("akita", None).unwrap();
    service.add_sub_breed("terrier", "irish").unwrap();

    assert_eq!(
        service.list_grouped().unwrap(),
        vec![group("akita", &[]), group("terrier", &["irish", "yorkshire"])]
    );
}

#[test]
fn listing_serializes_to_breed_and_sub_breed_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("beagle", None).unwrap();

    let json = serde_json::to_value(service.list_grouped().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "breed": "beagle", "sub_breeds": [] }])
    );
}

#[test]
fn add_dog_treats_blank_sub_breed_as_absent() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    let outcome = service.add_dog("Labrador", Some("  ")).unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.message, "Added breed Labrador");

    let repeat = service.add_dog("labrador", None).unwrap();
    assert!(!repeat.ok);
    assert_eq!(repeat.message, "Breed Labrador already exists");
}

#[test]
fn validation_failures_become_rejected_outcomes() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    let outcome = service.add_sub_breed("", "golden").unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.message, "breed name is required");
}

#[test]
fn delete_routes_report_missing_targets() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("poodle", Some("toy")).unwrap();

    let missing = service.delete_sub_breed("poodle", "giant").unwrap();
    assert!(!missing.ok);
    assert_eq!(missing.message, "Sub-breed Giant not found for Poodle");

    let last = service.delete_sub_breed("poodle", "toy").unwrap();
    assert!(last.ok);
    assert_eq!(service.list_grouped().unwrap(), vec![group("poodle", &[])]);

    assert!(service.delete_breed("poodle").unwrap().ok);
    assert!(!service.delete_breed("poodle").unwrap().ok);
    assert!(service.list_grouped().unwrap().is_empty());
}

#[test]
fn edit_dog_renames_breed_then_changed_sub_breeds() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("spaniel", Some("cocker")).unwrap();
    service.add_dog("spaniel", Some("welsh")).unwrap();

    let outcome = service
        .edit_dog(&edit_request(
            "spaniel",
            "springer",
            &["cocker", "welsh"],
            &["cocker", "english"],
        ))
        .unwrap();

    assert!(outcome.ok, "{}", outcome.message);
    assert_eq!(outcome.message, "Updated breed Springer");
    assert_eq!(
        service.list_grouped().unwrap(),
        vec![group("springer", &["cocker", "english"])]
    );
}

#[test]
fn edit_dog_stops_at_first_failed_pair() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("poodle", Some("toy")).unwrap();
    service.add_dog("poodle", Some("standard")).unwrap();
    service.add_dog("poodle", Some("giant")).unwrap();

    let outcome = service
        .edit_dog(&edit_request(
            "poodle",
            "poodle",
            &["toy", "standard", "giant"],
            &["mini", "giant", "large"],
        ))
        .unwrap();

    assert!(!outcome.ok);
    assert_eq!(
        outcome.message,
        "Could not rename sub-breed Standard to Giant for Poodle"
    );
    // The first pair is already committed; the third was never attempted.
    assert_eq!(
        service.list_grouped().unwrap(),
        vec![group("poodle", &["giant", "mini", "standard"])]
    );
}

#[test]
fn edit_dog_rejects_rename_onto_existing_breed() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("beagle", None).unwrap();
    service.add_dog("poodle", None).unwrap();

    let outcome = service
        .edit_dog(&edit_request("beagle", "poodle", &[], &[]))
        .unwrap();

    assert!(!outcome.ok);
    assert_eq!(
        service.list_grouped().unwrap(),
        vec![group("beagle", &[]), group("poodle", &[])]
    );
}

#[test]
fn edit_dog_rejects_mismatched_lists_and_accepts_no_op() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteBreedRepository::try_new(&mut conn).unwrap();
    let mut service = CatalogService::new(repo);

    service.add_dog("poodle", Some("toy")).unwrap();

    let mismatched = service
        .edit_dog(&edit_request("poodle", "poodle", &["toy"], &[]))
        .unwrap();
    assert!(!mismatched.ok);

    let unchanged = service
        .edit_dog(&edit_request("poodle", "Poodle", &["toy"], &["TOY"]))
        .unwrap();
    assert!(unchanged.ok);
    assert_eq!(unchanged.message, "No changes to Poodle");
}

/// Repository double whose writes fail at the storage layer.
struct UnavailableRepository {
    calls: RefCell<Vec<&'static str>>,
}

impl UnavailableRepository {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }

    fn fail(&self, op: &'static str) -> RepoError {
        self.calls.borrow_mut().push(op);
        RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }
}

impl BreedRepository for UnavailableRepository {
    fn list_all(&self) -> RepoResult<Vec<BreedRecord>> {
        Err(self.fail("list_all"))
    }

    fn add(&mut self, _breed: &str, _sub_breed: Option<&str>) -> RepoResult<bool> {
        Err(self.fail("add"))
    }

    fn add_sub_breed(&mut self, _breed: &str, _sub_breed: &str) -> RepoResult<bool> {
        Err(self.fail("add_sub_breed"))
    }

    fn delete(&mut self, _breed: &str, _sub_breed: Option<&str>) -> RepoResult<bool> {
        Err(self.fail("delete"))
    }

    fn edit(
        &mut self,
        _original_breed: &str,
        _new_breed: &str,
        _original_sub_breed: Option<&str>,
        _new_sub_breed: Option<&str>,
    ) -> RepoResult<bool> {
        Err(self.fail("edit"))
    }
}

#[test]
fn storage_errors_propagate_instead_of_becoming_outcomes() {
    let mut service = CatalogService::new(UnavailableRepository::new());

    assert!(matches!(service.list_grouped(), Err(RepoError::Db(_))));
    assert!(matches!(service.add_dog("pug", None), Err(RepoError::Db(_))));
    assert!(matches!(
        service.edit_dog(&edit_request("pug", "pug", &["a", "b"], &["c", "d"])),
        Err(RepoError::Db(_))
    ));

    let repo = service.into_inner();
    assert_eq!(*repo.calls.borrow(), vec!["list_all", "add", "edit"]);
}

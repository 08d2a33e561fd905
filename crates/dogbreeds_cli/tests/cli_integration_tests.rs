//! CLI integration tests
//!
//! Each test runs the `dogbreeds` binary against a database in a temp dir.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    let db_path = dir.join("dogs.sqlite3");
    Command::new(env!("CARGO_BIN_EXE_dogbreeds"))
        .current_dir(dir)
        .env_remove("DOGBREEDS_DB_PATH")
        .env_remove("DOGBREEDS_LOG_DIR")
        .env_remove("DOGBREEDS_LOG_LEVEL")
        .args(["--db", db_path.to_str().unwrap(), "--log-level", "error"])
        .args(args)
        .output()
        .expect("failed to execute dogbreeds")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn add_and_list_round_trip_through_database_file() {
    let temp_dir = TempDir::new().unwrap();

    let added = run(temp_dir.path(), &["add-dog", "--breed", "labrador"]);
    assert!(added.status.success());
    assert_eq!(stdout(&added).trim(), "Added breed Labrador");

    let attached = run(
        temp_dir.path(),
        &["add-sub-breed", "--breed", "labrador", "--sub-breed", "golden"],
    );
    assert!(attached.status.success());

    let listed = run(temp_dir.path(), &["list"]);
    assert!(listed.status.success());
    assert_eq!(stdout(&listed).trim(), "Labrador: Golden");
}

#[test]
fn rejected_action_exits_with_failure() {
    let temp_dir = TempDir::new().unwrap();

    assert!(run(temp_dir.path(), &["add-dog", "--breed", "pug"])
        .status
        .success());
    let repeat = run(temp_dir.path(), &["add-dog", "--breed", "pug"]);

    assert!(!repeat.status.success());
    assert!(String::from_utf8_lossy(&repeat.stderr).contains("Breed Pug already exists"));
}

#[test]
fn edit_dog_and_json_listing() {
    let temp_dir = TempDir::new().unwrap();

    run(
        temp_dir.path(),
        &["add-dog", "--breed", "spaniel", "--sub-breed", "cocker"],
    );
    let edited = run(
        temp_dir.path(),
        &[
            "edit-dog",
            "--original-breed",
            "spaniel",
            "--breed",
            "springer",
            "--original-sub-breed",
            "cocker",
            "--sub-breed",
            "english",
        ],
    );
    assert!(edited.status.success(), "{}", String::from_utf8_lossy(&edited.stderr));

    let listed = run(temp_dir.path(), &["list", "--json"]);
    assert!(listed.status.success());
    assert!(stdout(&listed).contains("\"springer\""));
    assert!(stdout(&listed).contains("\"english\""));
}

//! Breed repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own record identity and the placeholder/sub-breed invariants.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Inputs are normalized before any storage access.
//! - Every mutation runs in one `IMMEDIATE` transaction; uniqueness
//!   conflicts return `Ok(false)` and leave storage untouched.
//! - A breed with sub-breeds never keeps its placeholder row.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{with_transaction, DbError};
use crate::model::breed::{
    normalize_breed, normalize_optional_sub_breed, normalize_sub_breed, BreedRecord,
    BreedValidationError,
};
use log::info;
use rusqlite::{params, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from breed repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before storage access.
    Validation(BreedValidationError),
    /// Storage failure; the surrounding transaction has been rolled back.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "breed repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "breed repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "breed repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted breed data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BreedValidationError> for RepoError {
    fn from(value: BreedValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the breed catalog.
///
/// Mutations return `Ok(false)` when the request conflicts with existing
/// records or matches nothing; `Err` is reserved for invalid input and
/// storage failures.
pub trait BreedRepository {
    /// Lists every record ordered by breed, then sub-breed (placeholder first).
    fn list_all(&self) -> RepoResult<Vec<BreedRecord>>;
    /// Adds a breed placeholder, or one `(breed, sub_breed)` pair.
    fn add(&mut self, breed: &str, sub_breed: Option<&str>) -> RepoResult<bool>;
    /// Attaches a sub-breed, consuming the breed's placeholder if present.
    fn add_sub_breed(&mut self, breed: &str, sub_breed: &str) -> RepoResult<bool>;
    /// Deletes a whole breed, or one of its sub-breeds.
    fn delete(&mut self, breed: &str, sub_breed: Option<&str>) -> RepoResult<bool>;
    /// Renames a breed across all its rows, or edits one sub-breed row.
    fn edit(
        &mut self,
        original_breed: &str,
        new_breed: &str,
        original_sub_breed: Option<&str>,
        new_sub_breed: Option<&str>,
    ) -> RepoResult<bool>;
}

/// SQLite-backed breed repository.
pub struct SqliteBreedRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBreedRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_breed_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BreedRepository for SqliteBreedRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<BreedRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, breed, sub_breed
             FROM dogs
             ORDER BY breed ASC, sub_breed IS NOT NULL ASC, sub_breed ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_breed_row(row)?);
        }
        Ok(records)
    }

    fn add(&mut self, breed: &str, sub_breed: Option<&str>) -> RepoResult<bool> {
        let breed = normalize_breed(breed)?;
        let sub_breed = normalize_optional_sub_breed(sub_breed)?;

        let outcome = with_transaction(self.conn, "breed_add", |tx| match sub_breed.as_deref() {
            None => insert_placeholder(tx, &breed),
            Some(sub_breed) => attach_sub_breed(tx, &breed, sub_breed),
        })?;

        log_write("breed_add", &breed, sub_breed.as_deref(), outcome);
        Ok(outcome.applied())
    }

    fn add_sub_breed(&mut self, breed: &str, sub_breed: &str) -> RepoResult<bool> {
        let breed = normalize_breed(breed)?;
        let sub_breed = normalize_sub_breed(sub_breed)?;

        let outcome = with_transaction(self.conn, "breed_add_sub_breed", |tx| {
            attach_sub_breed(tx, &breed, &sub_breed)
        })?;

        log_write("breed_add_sub_breed", &breed, Some(sub_breed.as_str()), outcome);
        Ok(outcome.applied())
    }

    fn delete(&mut self, breed: &str, sub_breed: Option<&str>) -> RepoResult<bool> {
        let breed = normalize_breed(breed)?;
        let sub_breed = normalize_optional_sub_breed(sub_breed)?;

        let outcome = with_transaction(self.conn, "breed_delete", |tx| match sub_breed.as_deref() {
            None => delete_breed_rows(tx, &breed),
            Some(sub_breed) => detach_sub_breed(tx, &breed, sub_breed),
        })?;

        log_write("breed_delete", &breed, sub_breed.as_deref(), outcome);
        Ok(outcome.applied())
    }

    fn edit(
        &mut self,
        original_breed: &str,
        new_breed: &str,
        original_sub_breed: Option<&str>,
        new_sub_breed: Option<&str>,
    ) -> RepoResult<bool> {
        let original_breed = normalize_breed(original_breed)?;
        let new_breed = normalize_breed(new_breed)?;
        let original_sub_breed = normalize_optional_sub_breed(original_sub_breed)?;
        let new_sub_breed = normalize_optional_sub_breed(new_sub_breed)?;

        let outcome = match (original_sub_breed.as_deref(), new_sub_breed.as_deref()) {
            (None, Some(_)) => return Err(BreedValidationError::UnexpectedNewSubBreed.into()),
            (Some(_), None) => return Err(BreedValidationError::MissingNewSubBreed.into()),
            (None, None) => with_transaction(self.conn, "breed_rename", |tx| {
                rename_breed(tx, &original_breed, &new_breed)
            })?,
            (Some(original_sub), Some(new_sub)) => {
                with_transaction(self.conn, "sub_breed_edit", |tx| {
                    edit_sub_breed(
                        tx,
                        (original_breed.as_str(), original_sub),
                        (new_breed.as_str(), new_sub),
                    )
                })?
            }
        };

        info!(
            "event=breed_edit module=repo status=ok original_breed={} new_breed={} original_sub_breed={} new_sub_breed={} outcome={}",
            original_breed,
            new_breed,
            original_sub_breed.as_deref().unwrap_or("-"),
            new_sub_breed.as_deref().unwrap_or("-"),
            outcome.as_str()
        );
        Ok(outcome.applied())
    }
}

/// What a mutation did inside its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Inserted,
    FilledPlaceholder,
    ConvertedToPlaceholder,
    Updated,
    Deleted,
    Conflict,
    NotFound,
}

impl WriteOutcome {
    fn from_changed(changed: usize, applied: Self) -> Self {
        if changed == 0 {
            Self::NotFound
        } else {
            applied
        }
    }

    fn applied(self) -> bool {
        !matches!(self, Self::Conflict | Self::NotFound)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::FilledPlaceholder => "filled_placeholder",
            Self::ConvertedToPlaceholder => "converted_to_placeholder",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
        }
    }
}

fn insert_placeholder(conn: &Connection, breed: &str) -> RepoResult<WriteOutcome> {
    // Known breeds either have a placeholder already or have sub-breeds.
    if breed_known(conn, breed)? {
        return Ok(WriteOutcome::Conflict);
    }
    conn.execute(
        "INSERT INTO dogs (breed, sub_breed) VALUES (?1, NULL);",
        [breed],
    )?;
    Ok(WriteOutcome::Inserted)
}

fn attach_sub_breed(conn: &Connection, breed: &str, sub_breed: &str) -> RepoResult<WriteOutcome> {
    if pair_known(conn, breed, sub_breed)? {
        return Ok(WriteOutcome::Conflict);
    }

    let filled = conn.execute(
        "UPDATE dogs
         SET sub_breed = ?2
         WHERE breed = ?1
           AND sub_breed IS NULL;",
        params![breed, sub_breed],
    )?;
    if filled > 0 {
        return Ok(WriteOutcome::FilledPlaceholder);
    }

    conn.execute(
        "INSERT INTO dogs (breed, sub_breed) VALUES (?1, ?2);",
        params![breed, sub_breed],
    )?;
    Ok(WriteOutcome::Inserted)
}

fn delete_breed_rows(conn: &Connection, breed: &str) -> RepoResult<WriteOutcome> {
    let removed = conn.execute("DELETE FROM dogs WHERE breed = ?1;", [breed])?;
    Ok(WriteOutcome::from_changed(removed, WriteOutcome::Deleted))
}

fn detach_sub_breed(conn: &Connection, breed: &str, sub_breed: &str) -> RepoResult<WriteOutcome> {
    // The last sub-breed degrades to a placeholder so the breed stays known.
    if record_count(conn, breed)? == 1 {
        let changed = conn.execute(
            "UPDATE dogs
             SET sub_breed = NULL
             WHERE breed = ?1
               AND sub_breed = ?2;",
            [breed, sub_breed],
        )?;
        return Ok(WriteOutcome::from_changed(
            changed,
            WriteOutcome::ConvertedToPlaceholder,
        ));
    }

    let removed = conn.execute(
        "DELETE FROM dogs WHERE breed = ?1 AND sub_breed = ?2;",
        [breed, sub_breed],
    )?;
    Ok(WriteOutcome::from_changed(removed, WriteOutcome::Deleted))
}

fn rename_breed(conn: &Connection, original: &str, renamed: &str) -> RepoResult<WriteOutcome> {
    if renamed != original && breed_known(conn, renamed)? {
        return Ok(WriteOutcome::Conflict);
    }
    let changed = conn.execute(
        "UPDATE dogs SET breed = ?2 WHERE breed = ?1;",
        [original, renamed],
    )?;
    Ok(WriteOutcome::from_changed(changed, WriteOutcome::Updated))
}

fn edit_sub_breed(
    conn: &Connection,
    (original_breed, original_sub): (&str, &str),
    (new_breed, new_sub): (&str, &str),
) -> RepoResult<WriteOutcome> {
    let is_self = new_breed == original_breed && new_sub == original_sub;
    if !is_self && pair_known(conn, new_breed, new_sub)? {
        return Ok(WriteOutcome::Conflict);
    }

    let changed = conn.execute(
        "UPDATE dogs
         SET breed = ?3,
             sub_breed = ?4
         WHERE breed = ?1
           AND sub_breed = ?2;",
        [original_breed, original_sub, new_breed, new_sub],
    )?;
    if changed > 0 && new_breed != original_breed {
        // Moving into a placeholder-only breed consumes the placeholder.
        conn.execute(
            "DELETE FROM dogs WHERE breed = ?1 AND sub_breed IS NULL;",
            [new_breed],
        )?;
    }
    Ok(WriteOutcome::from_changed(changed, WriteOutcome::Updated))
}

fn breed_known(conn: &Connection, breed: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM dogs WHERE breed = ?1);",
        [breed],
    )
}

fn pair_known(conn: &Connection, breed: &str, sub_breed: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM dogs WHERE breed = ?1 AND sub_breed = ?2);",
        [breed, sub_breed],
    )
}

fn record_count(conn: &Connection, breed: &str) -> RepoResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM dogs WHERE breed = ?1;",
        [breed],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn exists(conn: &Connection, sql: &str, params: impl Params) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(exists == 1)
}

fn log_write(event: &str, breed: &str, sub_breed: Option<&str>, outcome: WriteOutcome) {
    info!(
        "event={event} module=repo status=ok breed={breed} sub_breed={} outcome={}",
        sub_breed.unwrap_or("-"),
        outcome.as_str()
    );
}

fn parse_breed_row(row: &Row<'_>) -> RepoResult<BreedRecord> {
    let id: i64 = row.get("id")?;
    let breed: String = row.get("breed")?;
    if breed.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty breed name in dogs.breed for id {id}"
        )));
    }

    let sub_breed: Option<String> = row.get("sub_breed")?;
    if sub_breed.as_deref().is_some_and(|value| value.trim().is_empty()) {
        return Err(RepoError::InvalidData(format!(
            "empty sub-breed name in dogs.sub_breed for id {id}"
        )));
    }

    Ok(BreedRecord {
        id,
        breed,
        sub_breed,
    })
}

fn ensure_breed_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "dogs")? {
        return Err(RepoError::MissingRequiredTable("dogs"));
    }

    for column in ["id", "breed", "sub_breed"] {
        if !table_has_column(conn, "dogs", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "dogs",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    exists(
        conn,
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
    )
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

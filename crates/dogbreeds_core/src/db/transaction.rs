//! Scoped write transactions.
//!
//! # Invariants
//! - Transactions start as `IMMEDIATE`, so existence checks and the writes
//!   that depend on them hold the same write lock.
//! - `Ok` commits; `Err` rolls back before the error reaches the caller.

use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::time::Instant;

/// Runs `body` inside one write transaction named `op` for logging.
///
/// # Errors
/// - Returns the error produced by `body` after rolling back.
/// - Returns a storage error when begin/commit fails.
pub fn with_transaction<T, E, F>(conn: &mut Connection, op: &'static str, body: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error> + Display,
{
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match body(&tx) {
        Ok(value) => {
            tx.commit()?;
            debug!(
                "event=tx_commit module=db status=ok op={op} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error op={op} error={rollback_err}"
                );
            }
            warn!(
                "event=tx_rollback module=db status=ok op={op} duration_ms={} cause={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

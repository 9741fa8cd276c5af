//! SQLite storage bootstrap, schema migrations and transaction boundaries.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the notehub core.
//! - Apply schema migrations in deterministic order.
//! - Provide the single write-transaction boundary used by every mutating
//!   use-case.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Mutations that read an aggregate and write a derived row run inside one
//!   `BEGIN IMMEDIATE` transaction.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// SQL expression producing the current time as Unix epoch milliseconds.
pub(crate) const NOW_EPOCH_MS_SQL: &str =
    "CAST(ROUND((julianday('now') - 2440587.5) * 86400000.0) AS INTEGER)";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

/// Runs `work` inside an immediate write transaction.
///
/// When the connection is already inside a transaction, `work` runs inline and
/// the outer owner decides whether to commit. Otherwise a new transaction is
/// opened, committed when `work` succeeds and rolled back on any error.
pub fn write_transaction<T, E>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    if !conn.is_autocommit() {
        return work(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&*tx)?;
    tx.commit()?;
    Ok(value)
}

//! Task database bootstrap.
//!
//! # Responsibility
//! - Open SQLite connections with task-store pragmas set.
//! - Bring the `tasks` / `task_tags` schema to the latest version.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A failed migration step names its version and rolls back every step.
//! - A file written by a newer build is never opened.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the task database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// One migration step failed; nothing from the batch was committed.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file carries a schema this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable `error_code` value for `event=db_open` log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite",
            Self::Migration { .. } => "db_migration_failed",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "task schema migration {version} ({name}) failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "task database schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

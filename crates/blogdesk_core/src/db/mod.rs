//! Local persistence layer: one SQLite file holding named key-value slots.
//!
//! # Responsibility
//! - Hand out connections whose schema is current (`open_db`,
//!   `open_db_in_memory`).
//! - Read, replace and remove whole slot values (`slot`).
//!
//! # Invariants
//! - A slot value is only ever replaced wholesale, never patched.
//! - A file written by a newer schema is refused rather than downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
pub mod slot;

pub use open::{open_db, open_db_in_memory};
pub use slot::{read_slot, remove_slot, write_slot};

pub type DbResult<T> = Result<T, DbError>;

/// Failure opening, migrating or accessing the slot database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was created by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "slot database uses schema v{db_version}; this build reads up to v{latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

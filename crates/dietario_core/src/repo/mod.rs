//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define CRUD + transactional-batch contracts per domain.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Each repository owns exactly one connection for its whole lifetime.
//! - Single-statement writes autocommit; multi-statement writes run inside
//!   an explicit transaction that rolls back as a whole on any failure.
//! - Not-found reads are `Ok(None)` and zero-row writes are `Ok(false)`,
//!   never errors.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod book_repo;
pub mod nutrition_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update/delete was attempted on a record that was never persisted.
    MissingId(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId(entity) => {
                write!(f, "cannot address a {entity} that was never persisted")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingId(_) => None,
        }
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

//! Persistence backend contract and implementations.
//!
//! # Responsibility
//! - Define the two-operation contract the persistence coordinator relies on.
//! - Provide the default no-op backend plus in-memory and SQLite backends.
//!
//! # Invariants
//! - A backend reports each outcome through its `Completion` at most once;
//!   `FnOnce` enforces this.
//! - Backends may complete synchronously or keep the completion and call it
//!   later.
//! - Backend failures are reported as `false`, never panicked.

use crate::db::DbError;
use crate::model::instance::Model;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_repo;
pub mod sqlite_repo;

pub use memory_repo::MemoryBackend;
pub use sqlite_repo::SqliteBackend;

/// Outcome callback handed to a backend: `true` on success.
pub type Completion = Box<dyn FnOnce(bool)>;

/// Injectable storage collaborator for one model type.
pub trait PersistenceBackend {
    fn save(&self, model: &Model, done: Completion);
    fn destroy(&self, model: &Model, done: Completion);
}

/// Default backend: accepts every save and destroy immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl PersistenceBackend for NoopBackend {
    fn save(&self, _model: &Model, done: Completion) {
        done(true);
    }

    fn destroy(&self, _model: &Model, done: Completion) {
        done(true);
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by backend setup and read-back APIs.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "attribute serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
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

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

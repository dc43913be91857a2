//! Typed configuration for logging and storage.
//!
//! # Responsibility
//! - Parse caller-provided JSON settings into typed values.
//! - Build the persistence backend selected by configuration.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown top-level fields and
//!   storage kinds are rejected.
//! - Building a backend never panics; failures surface as `ConfigError`.

use crate::logging::{default_log_level, init_logging};
use crate::repo::{MemoryBackend, NoopBackend, PersistenceBackend, RepoError, SqliteBackend};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Path value selecting a private in-memory SQLite database.
pub const SQLITE_IN_MEMORY_PATH: &str = ":memory:";

/// Backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Accept every save/destroy without storing anything.
    #[default]
    Noop,
    /// Keep snapshots in process memory.
    Memory,
    /// Persist records to a SQLite database file.
    Sqlite { path: String },
}

impl StorageConfig {
    /// Builds the configured backend.
    ///
    /// # Errors
    /// - Returns `ConfigError::InvalidValue` for an empty SQLite path.
    /// - Returns `ConfigError::Storage` when the database cannot be opened.
    pub fn build_backend(&self) -> Result<Rc<dyn PersistenceBackend>, ConfigError> {
        match self {
            Self::Noop => Ok(Rc::new(NoopBackend)),
            Self::Memory => Ok(Rc::new(MemoryBackend::new())),
            Self::Sqlite { path } => {
                let trimmed = path.trim();
                if trimmed.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "storage.path",
                        message: "sqlite path cannot be empty".to_string(),
                    });
                }
                let backend = if trimmed == SQLITE_IN_MEMORY_PATH {
                    SqliteBackend::open_in_memory()
                } else {
                    SqliteBackend::open(trimmed)
                }
                .map_err(ConfigError::Storage)?;
                Ok(Rc::new(backend))
            }
        }
    }
}

/// Top-level settings for embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<String>,
    pub storage: StorageConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            storage: StorageConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Parses settings from a JSON document.
    pub fn from_json_str(value: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(value).map_err(ConfigError::Parse)
    }

    /// Starts file logging when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no directory is configured.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        init_logging(&self.log_level, log_dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}

/// Configuration parse and bootstrap errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidValue {
        field: &'static str,
        message: String,
    },
    Logging(String),
    Storage(RepoError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid configuration: {err}"),
            Self::InvalidValue { field, message } => write!(f, "invalid `{field}`: {message}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Storage(err) => write!(f, "storage setup failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::InvalidValue { .. } | Self::Logging(_) => None,
        }
    }
}

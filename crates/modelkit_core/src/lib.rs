//! Core model layer for modelkit.
//! This crate owns attribute/change state, validation, persistence
//! orchestration and lifecycle events.

pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, StorageConfig};
pub use event::{EventHub, EventName, Listener, ListenerId};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attributes::{AttributeStore, Attributes};
pub use model::collection::Collection;
pub use model::error_bag::ErrorBag;
pub use model::instance::{Model, ID_ATTRIBUTE};
pub use model::model_type::{ModelType, ModelTypeBuilder};
pub use model::ModelError;
pub use repo::{
    Completion, MemoryBackend, NoopBackend, PersistenceBackend, RepoError, RepoResult,
    SqliteBackend,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, backend calls and state finalization.
//! - Keep models decoupled from concrete backend behavior.

pub mod persistence_service;

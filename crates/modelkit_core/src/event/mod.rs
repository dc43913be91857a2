//! Event names and dispatch.
//!
//! # Responsibility
//! - Define the event vocabulary used by models and model types.
//! - Provide the hub used for both per-instance and any-instance scopes.
//!
//! # Invariants
//! - `change` and `change:<attr>` fire on per-instance hubs only.
//! - `initialize` fires on the any-instance hub only.

pub mod hub;
pub mod name;

pub use hub::{EventHub, Listener, ListenerId};
pub use name::EventName;

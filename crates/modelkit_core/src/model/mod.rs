//! In-memory model layer.
//!
//! # Responsibility
//! - Define model types, instances and their attribute/change state.
//! - Keep class-wide collections and validation state consistent with the
//!   persistence outcome.
//!
//! # Invariants
//! - Committed attributes change only through construction or a successful
//!   save.
//! - A failed validation or backend call leaves every piece of state as it
//!   was before the call.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod attributes;
pub mod collection;
pub mod error_bag;
pub mod instance;
pub mod model_type;
pub mod validators;

/// Errors raised by model type and instance APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownMethod { model: String, method: String },
    /// Every handle to the instance's model type was dropped.
    DetachedInstance { model: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMethod { model, method } => {
                write!(f, "model `{model}` has no method `{method}`")
            }
            Self::DetachedInstance { model } => {
                write!(f, "model type `{model}` is no longer alive")
            }
        }
    }
}

impl Error for ModelError {}

//! Reusable checks for `validate` hooks.
//!
//! Each helper reads the merged view of `model` and appends to `errors`;
//! none of them touch model state.

use crate::model::error_bag::ErrorBag;
use crate::model::instance::Model;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const BLANK_MESSAGE: &str = "can't be blank";
pub const INVALID_MESSAGE: &str = "is invalid";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Fails when `attribute` is absent, null, or a blank string.
pub fn validate_presence(model: &Model, errors: &mut ErrorBag, attribute: &str) {
    let blank = match model.get(attribute) {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    };
    if blank {
        errors.add(attribute, BLANK_MESSAGE);
    }
}

/// Fails when `attribute` is not a string matching `pattern`.
///
/// Absent and null values are skipped; combine with [`validate_presence`]
/// to require them.
pub fn validate_format(
    model: &Model,
    errors: &mut ErrorBag,
    attribute: &str,
    pattern: &Regex,
    message: &str,
) {
    match model.get(attribute) {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) if pattern.is_match(&text) => {}
        Some(_) => errors.add(attribute, message),
    }
}

/// [`validate_format`] with a permissive `local@domain.tld` pattern.
pub fn validate_email(model: &Model, errors: &mut ErrorBag, attribute: &str) {
    validate_format(model, errors, attribute, &EMAIL_RE, INVALID_MESSAGE);
}

/// Fails when a string attribute has fewer than `min` or more than `max`
/// characters. Non-string values are skipped.
pub fn validate_length(
    model: &Model,
    errors: &mut ErrorBag,
    attribute: &str,
    min: Option<usize>,
    max: Option<usize>,
) {
    let Some(Value::String(text)) = model.get(attribute) else {
        return;
    };
    let length = text.chars().count();
    if let Some(min) = min {
        if length < min {
            errors.add(attribute, format!("is too short (minimum is {min} characters)"));
        }
    }
    if let Some(max) = max {
        if length > max {
            errors.add(attribute, format!("is too long (maximum is {max} characters)"));
        }
    }
}

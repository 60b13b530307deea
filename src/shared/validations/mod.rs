//! Explicit request-shape validation
//!
//! Independent of the HTTP layer: every check returns the violations it
//! found and callers aggregate them into a single list.

use validator::ValidateEmail;

use crate::domain::{DomainError, DomainResult, Violation};

/// Implemented by every inbound request type.
pub trait ValidateRequest {
    /// All violations found, in field order. Empty when the request is valid.
    fn violations(&self) -> Vec<Violation>;

    fn validate(&self) -> DomainResult<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }
}

/// Value is present and not blank.
pub fn required(field: &'static str, value: Option<&str>) -> Option<Violation> {
    match value {
        Some(v) if !v.trim().is_empty() => None,
        _ => Some(Violation::Required { field }),
    }
}

/// Required and shaped like an email address.
pub fn required_email(field: &'static str, value: Option<&str>) -> Option<Violation> {
    if let Some(missing) = required(field, value) {
        return Some(missing);
    }
    let value = value.unwrap_or_default();
    if value.trim().validate_email() {
        None
    } else {
        Some(Violation::InvalidEmail {
            value: value.to_string(),
        })
    }
}

/// Required and at least `min` characters long.
pub fn required_min_length(field: &'static str, value: Option<&str>, min: usize) -> Option<Violation> {
    if let Some(missing) = required(field, value) {
        return Some(missing);
    }
    if value.unwrap_or_default().trim().chars().count() < min {
        Some(Violation::TooShort { field, min })
    } else {
        None
    }
}

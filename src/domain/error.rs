//! Domain errors
//!
//! Errors carry structured data only. Display text for API clients is
//! produced by the message catalog in [`crate::shared::messages`].

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A single password policy rule that a candidate password failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    TooShort { min: usize },
    RequiresNonAlphanumeric,
    RequiresDigit,
    RequiresLower,
    RequiresUpper,
    RequiresUniqueChars { min: usize },
}

/// A single input-shape or policy violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Field missing or blank
    Required { field: &'static str },
    /// Field is not a syntactically valid email address
    InvalidEmail { value: String },
    /// User name contains characters outside the allowed set
    InvalidUserName { value: String },
    /// Field shorter than the allowed minimum
    TooShort { field: &'static str, min: usize },
    /// Password rejected by the configured policy
    Password(PolicyViolation),
}

/// Error category, one per response class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Authentication,
    LockedOut,
    Internal,
}

/// Domain-level error types
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<Violation>),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Role already exists: {0}")]
    DuplicateRole(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked out until {until}")]
    LockedOut { until: DateTime<Utc> },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateEmail(_) | Self::DuplicateRole(_) => ErrorKind::Conflict,
            Self::UserNotFound(_) | Self::RoleNotFound(_) => ErrorKind::NotFound,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::LockedOut { .. } => ErrorKind::LockedOut,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for a validation error holding exactly one violation.
    pub fn violation(v: Violation) -> Self {
        Self::Validation(vec![v])
    }
}

/// Infrastructure failures that never reach API clients verbatim.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::Storage(err.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

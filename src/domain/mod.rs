//! Domain layer: entities, errors and persistence ports

pub mod error;
pub mod role;
pub mod user;

pub use error::{DomainError, DomainResult, ErrorKind, InfraError, PolicyViolation, Violation};
pub use role::{normalize_role_name, AssignOutcome, Role, RoleStore};
pub use user::{is_valid_user_name, normalize_email, AccountStore, NewUser, User};

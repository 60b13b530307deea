//! Identity module: registration, authentication and roles
//!
//! `CredentialVerifier` owns everything password related (policy, hashing,
//! lockout). `RoleService` covers role creation and membership.

pub mod credential_verifier;
pub mod lockout;
pub mod password_policy;
pub mod role_service;

pub use credential_verifier::CredentialVerifier;
pub use lockout::{Clock, LockoutPolicy, SystemClock, MAX_LOCKOUT_MINUTES};
pub use password_policy::PasswordPolicy;
pub use role_service::RoleService;

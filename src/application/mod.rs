pub mod identity;

// Re-export key types for convenience
pub use identity::{
    Clock, CredentialVerifier, LockoutPolicy, PasswordPolicy, RoleService, SystemClock,
};

use chrono::{DateTime, Utc};

/// Registered account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub access_failed_count: i32,
    pub lockout_enabled: bool,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is currently locked out at `now`.
    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_enabled && self.lockout_end.is_some_and(|end| end > now)
    }
}

/// Characters accepted in a user name. The email doubles as the user name.
pub const ALLOWED_USER_NAME_CHARACTERS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._@+";

pub fn is_valid_user_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| ALLOWED_USER_NAME_CHARACTERS.contains(c))
}

/// Canonical form used for case-insensitive email lookups and uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

use chrono::{DateTime, Utc};

/// Named role that users can be members of
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub normalized_name: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a role assignment that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// A new membership was stored
    Assigned,
    /// The user already held the role; nothing changed
    AlreadyMember,
}

pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}

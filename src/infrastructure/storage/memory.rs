//! In-memory identity store

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    normalize_email, normalize_role_name, AccountStore, AssignOutcome, DomainError,
    DomainResult, NewUser, Role, RoleStore, User,
};

/// In-memory account and role store for development and testing.
///
/// Uniqueness of emails and role names is enforced through `DashMap`
/// entry locking on the normalized key.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    users: DashMap<String, User>,
    /// normalized email -> user id
    emails: DashMap<String, String>,
    /// normalized role name -> role
    roles: DashMap<String, Role>,
    /// user id -> normalized role names
    memberships: DashMap<String, BTreeSet<String>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryIdentityStore {
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let normalized = normalize_email(&new_user.email);
        match self.emails.entry(normalized.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateEmail(new_user.email)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: new_user.email,
                    normalized_email: normalized,
                    password_hash: new_user.password_hash,
                    access_failed_count: 0,
                    lockout_enabled: new_user.lockout_enabled,
                    lockout_end: None,
                    created_at: now,
                    updated_at: now,
                };
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let id = match self.emails.get(&normalize_email(email)) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn record_failed_access(&self, id: &str) -> DomainResult<i32> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        user.access_failed_count += 1;
        user.updated_at = Utc::now();
        Ok(user.access_failed_count)
    }

    async fn lock_out(&self, id: &str, until: DateTime<Utc>) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        user.lockout_end = Some(until);
        user.access_failed_count = 0;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_access_failed(&self, id: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        user.access_failed_count = 0;
        if user.lockout_end.is_some_and(|end| end <= now) {
            user.lockout_end = None;
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl RoleStore for InMemoryIdentityStore {
    async fn create_role(&self, name: &str) -> DomainResult<Role> {
        let normalized = normalize_role_name(name);
        match self.roles.entry(normalized.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateRole(name.to_string())),
            Entry::Vacant(slot) => {
                let role = Role {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    normalized_name: normalized,
                    created_at: Utc::now(),
                };
                slot.insert(role.clone());
                Ok(role)
            }
        }
    }

    async fn role_exists(&self, name: &str) -> DomainResult<bool> {
        Ok(self.roles.contains_key(&normalize_role_name(name)))
    }

    async fn find_role_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        Ok(self.roles.get(&normalize_role_name(name)).map(|r| r.clone()))
    }

    async fn assign_role(&self, user_id: &str, role_name: &str) -> DomainResult<AssignOutcome> {
        if !self.users.contains_key(user_id) {
            return Err(DomainError::UserNotFound(user_id.to_string()));
        }
        let normalized = normalize_role_name(role_name);
        if !self.roles.contains_key(&normalized) {
            return Err(DomainError::RoleNotFound(role_name.to_string()));
        }

        let mut held = self.memberships.entry(user_id.to_string()).or_default();
        if held.insert(normalized) {
            Ok(AssignOutcome::Assigned)
        } else {
            Ok(AssignOutcome::AlreadyMember)
        }
    }

    async fn roles_for_user(&self, user_id: &str) -> DomainResult<Vec<String>> {
        let normalized: Vec<String> = match self.memberships.get(user_id) {
            Some(held) => held.iter().cloned().collect(),
            None => return Ok(Vec::new()),
        };

        let mut names: Vec<String> = normalized
            .iter()
            .filter_map(|n| self.roles.get(n).map(|r| r.name.clone()))
            .collect();
        names.sort();
        Ok(names)
    }
}

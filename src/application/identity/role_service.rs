//! Role management use-cases

use std::sync::Arc;

use tracing::info;

use crate::domain::{AccountStore, AssignOutcome, DomainError, DomainResult, Role, RoleStore};

/// Orchestrates role creation and assignment by email.
pub struct RoleService {
    accounts: Arc<dyn AccountStore>,
    roles: Arc<dyn RoleStore>,
}

impl RoleService {
    pub fn new(accounts: Arc<dyn AccountStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { accounts, roles }
    }

    pub async fn create_role(&self, name: &str) -> DomainResult<Role> {
        let role = self.roles.create_role(name.trim()).await?;
        info!(role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Give the user identified by `email` the role `role_name`.
    /// Holding the role already is not an error.
    pub async fn assign_role(&self, email: &str, role_name: &str) -> DomainResult<AssignOutcome> {
        let user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(email.to_string()))?;

        if !self.roles.role_exists(role_name).await? {
            return Err(DomainError::RoleNotFound(role_name.to_string()));
        }

        let outcome = self.roles.assign_role(&user.id, role_name).await?;
        info!(user_id = %user.id, role = %role_name, ?outcome, "Role assigned");
        Ok(outcome)
    }

    pub async fn roles_for_email(&self, email: &str) -> DomainResult<Vec<String>> {
        let user = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(email.to_string()))?;

        self.roles.roles_for_user(&user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;
    use crate::infrastructure::storage::InMemoryIdentityStore;

    async fn service_with_user() -> RoleService {
        let store = Arc::new(InMemoryIdentityStore::new());
        store
            .create_user(NewUser {
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                lockout_enabled: true,
            })
            .await
            .unwrap();
        RoleService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn creating_admin_twice_fails() {
        let service = service_with_user().await;
        service.create_role("Admin").await.unwrap();
        assert!(matches!(
            service.create_role("Admin").await,
            Err(DomainError::DuplicateRole(_))
        ));
    }

    #[tokio::test]
    async fn assign_missing_user_or_role_is_not_found() {
        let service = service_with_user().await;
        service.create_role("Admin").await.unwrap();

        assert!(matches!(
            service.assign_role("ghost@x.com", "Admin").await,
            Err(DomainError::UserNotFound(_))
        ));
        assert!(matches!(
            service.assign_role("a@x.com", "Ghost").await,
            Err(DomainError::RoleNotFound(_))
        ));
    }

    #[tokio::test]
    async fn reassigning_is_idempotent() {
        let service = service_with_user().await;
        service.create_role("Admin").await.unwrap();

        assert_eq!(
            service.assign_role("a@x.com", "Admin").await.unwrap(),
            AssignOutcome::Assigned
        );
        assert_eq!(
            service.assign_role("A@X.com", "admin").await.unwrap(),
            AssignOutcome::AlreadyMember
        );
        assert_eq!(service.roles_for_email("a@x.com").await.unwrap(), vec!["Admin"]);
    }
}

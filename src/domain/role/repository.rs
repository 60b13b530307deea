use async_trait::async_trait;

use super::{AssignOutcome, Role};
use crate::domain::DomainResult;

/// Persistence port for roles and user-role memberships.
///
/// Role names are compared case-insensitively. Name uniqueness and
/// membership uniqueness per `(user, role)` are enforced by the store.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fails with `DomainError::DuplicateRole` if the name is taken.
    async fn create_role(&self, name: &str) -> DomainResult<Role>;

    async fn role_exists(&self, name: &str) -> DomainResult<bool>;

    async fn find_role_by_name(&self, name: &str) -> DomainResult<Option<Role>>;

    /// Fails with `UserNotFound` / `RoleNotFound` when either side is missing.
    /// Re-assigning an existing membership yields `AssignOutcome::AlreadyMember`.
    async fn assign_role(&self, user_id: &str, role_name: &str) -> DomainResult<AssignOutcome>;

    /// Role names held by the user, sorted by name.
    async fn roles_for_user(&self, user_id: &str) -> DomainResult<Vec<String>>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{NewUser, User};
use crate::domain::DomainResult;

/// Persistence port for user accounts.
///
/// Implementations must enforce email uniqueness atomically: two concurrent
/// `create_user` calls with the same normalized email must not both succeed.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new user. Fails with `DomainError::DuplicateEmail` if the
    /// normalized email is already taken.
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User>;

    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    /// Atomically increment the failed-access counter and return the new value.
    async fn record_failed_access(&self, id: &str) -> DomainResult<i32>;

    /// Set the lockout end and reset the failed-access counter.
    async fn lock_out(&self, id: &str, until: DateTime<Utc>) -> DomainResult<()>;

    /// Reset the failed-access counter and clear a lockout that ended at or
    /// before `now`.
    async fn reset_access_failed(&self, id: &str, now: DateTime<Utc>) -> DomainResult<()>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()>;
}

//! Credential verification: registration, password checks and lockout
//!
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use super::lockout::{Clock, LockoutPolicy, SystemClock};
use super::password_policy::PasswordPolicy;
use crate::domain::{
    is_valid_user_name, AccountStore, DomainError, DomainResult, NewUser, User, Violation,
};
use crate::infrastructure::crypto::PasswordHasher;

fn count_registration(outcome: &'static str) {
    metrics::counter!("identity_registrations_total", "outcome" => outcome).increment(1);
}

fn count_login(outcome: &'static str) {
    metrics::counter!("identity_logins_total", "outcome" => outcome).increment(1);
}

/// Hashes and verifies passwords, enforces the password policy and keeps
/// the failed-attempt counters that drive lockout.
pub struct CredentialVerifier {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    password_policy: PasswordPolicy,
    lockout: LockoutPolicy,
    clock: Arc<dyn Clock>,
}

impl CredentialVerifier {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: PasswordHasher,
        password_policy: PasswordPolicy,
        lockout: LockoutPolicy,
    ) -> Self {
        Self {
            accounts,
            hasher,
            password_policy,
            lockout,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn check_policy(&self, password: &str) -> DomainResult<()> {
        let violations: Vec<Violation> = self
            .password_policy
            .check(password)
            .into_iter()
            .map(Violation::Password)
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new account. The password policy is checked first, then
    /// the email as user name, then uniqueness.
    pub async fn register(&self, email: &str, password: &str) -> DomainResult<User> {
        if let Err(e) = self.check_policy(password) {
            count_registration("rejected");
            return Err(e);
        }

        let email = email.trim();
        if !is_valid_user_name(email) {
            count_registration("rejected");
            return Err(DomainError::violation(Violation::InvalidUserName {
                value: email.to_string(),
            }));
        }

        let password_hash = self.hasher.hash(password)?;
        let result = self
            .accounts
            .create_user(NewUser {
                email: email.to_string(),
                password_hash,
                lockout_enabled: self.lockout.allowed_for_new_users,
            })
            .await;

        match result {
            Ok(user) => {
                count_registration("success");
                info!(user_id = %user.id, email = %user.email, "New user registered");
                Ok(user)
            }
            Err(e) => {
                count_registration(if matches!(e, DomainError::DuplicateEmail(_)) {
                    "duplicate"
                } else {
                    "error"
                });
                Err(e)
            }
        }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check an email/password pair, updating the lockout state.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.accounts.find_by_email(email).await? else {
            self.hasher.verify_dummy(password);
            count_login("invalid");
            info!(email = %email, "Login failed: unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        let now = self.clock.now();
        if user.is_locked_out(now) {
            count_login("locked_out");
            warn!(user_id = %user.id, "Login rejected: account locked out");
            return Err(DomainError::LockedOut {
                until: user.lockout_end.unwrap_or(now),
            });
        }

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(self.register_failure(&user).await?);
        }

        self.accounts.reset_access_failed(&user.id, now).await?;
        count_login("success");
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Count a wrong password and decide between a plain rejection and a
    /// fresh lockout.
    async fn register_failure(&self, user: &User) -> DomainResult<DomainError> {
        if !user.lockout_enabled {
            count_login("invalid");
            return Ok(DomainError::InvalidCredentials);
        }

        let failed = self.accounts.record_failed_access(&user.id).await?;
        if !self.lockout.should_lock(failed) {
            count_login("invalid");
            info!(user_id = %user.id, failed_attempts = failed, "Login failed: wrong password");
            return Ok(DomainError::InvalidCredentials);
        }

        let until = self.lockout.lockout_end(self.clock.now()).ok_or_else(|| {
            DomainError::Storage(format!(
                "lockout window of {} minutes is out of range",
                self.lockout.lockout_minutes
            ))
        })?;
        self.accounts.lock_out(&user.id, until).await?;
        metrics::counter!("identity_lockouts_total").increment(1);
        count_login("locked_out");
        warn!(user_id = %user.id, until = %until, "Account locked out after repeated failures");
        Ok(DomainError::LockedOut { until })
    }

    // ── Password change ─────────────────────────────────────────

    /// Replace the password after verifying the current one. A wrong
    /// current password counts towards lockout.
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        let user = self.authenticate(email, current_password).await?;
        self.check_policy(new_password)?;

        let password_hash = self.hasher.hash(new_password)?;
        self.accounts
            .update_password_hash(&user.id, &password_hash)
            .await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}

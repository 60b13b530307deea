//! Password policy
//!
//! Character classes are ASCII only: digits `0-9`, lower `a-z`, upper
//! `A-Z`. Everything else counts as non-alphanumeric.

use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::PolicyViolation;

/// Configurable password requirements
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub required_unique_chars: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            require_non_alphanumeric: false,
            require_digit: true,
            require_lowercase: false,
            require_uppercase: false,
            required_unique_chars: 1,
        }
    }
}

impl PasswordPolicy {
    /// Every rule the password breaks, in a fixed order.
    pub fn check(&self, password: &str) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();

        if password.chars().count() < self.required_length {
            violations.push(PolicyViolation::TooShort {
                min: self.required_length,
            });
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            violations.push(PolicyViolation::RequiresNonAlphanumeric);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PolicyViolation::RequiresDigit);
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PolicyViolation::RequiresLower);
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PolicyViolation::RequiresUpper);
        }
        if self.required_unique_chars >= 1 {
            let unique = password.chars().collect::<HashSet<_>>().len();
            if unique < self.required_unique_chars {
                violations.push(PolicyViolation::RequiresUniqueChars {
                    min: self.required_unique_chars,
                });
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> PasswordPolicy {
        PasswordPolicy {
            required_length: 8,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            required_unique_chars: 4,
        }
    }

    #[test]
    fn default_policy_needs_six_chars_and_a_digit() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Abc123").is_empty());
        assert!(policy.check("abcdef1").is_empty());
        assert_eq!(policy.check("abcdef"), vec![PolicyViolation::RequiresDigit]);
        assert_eq!(
            policy.check("ab1"),
            vec![PolicyViolation::TooShort { min: 6 }]
        );
    }

    #[test]
    fn violations_come_in_fixed_order() {
        assert_eq!(
            strict().check("aaa"),
            vec![
                PolicyViolation::TooShort { min: 8 },
                PolicyViolation::RequiresNonAlphanumeric,
                PolicyViolation::RequiresDigit,
                PolicyViolation::RequiresUpper,
                PolicyViolation::RequiresUniqueChars { min: 4 },
            ]
        );
    }

    #[test]
    fn empty_password_breaks_every_enabled_rule() {
        assert_eq!(strict().check("").len(), 6);
    }

    #[test]
    fn non_ascii_letters_count_as_non_alphanumeric() {
        let policy = PasswordPolicy {
            require_non_alphanumeric: true,
            require_digit: false,
            ..PasswordPolicy::default()
        };
        assert!(policy.check("şifreler").is_empty());
        assert_eq!(
            policy.check("password"),
            vec![PolicyViolation::RequiresNonAlphanumeric]
        );
    }

    #[test]
    fn strict_policy_accepts_strong_password() {
        assert!(strict().check("Str0ng!Pass").is_empty());
    }
}

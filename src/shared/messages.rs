//! Localizable message catalog
//!
//! Every string returned to API clients is looked up here by [`MessageKey`].
//! A catalog starts from one of the built-in locales and can have individual
//! entries replaced from configuration (`[i18n.overrides]`).
//!
//! Templates use `{name}` placeholders, e.g. `"Parola en az {length} karakter olmalıdır."`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, PolicyViolation, Violation};

/// Built-in locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

/// Identifier of a single user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    InvalidRequest,
    DefaultError,
    RegisterSucceeded,
    LoginSucceeded,
    RoleCreated,
    RoleAssigned,
    PasswordChanged,
    InvalidCredentials,
    LockedOut,
    UserNotFound,
    RoleNotFound,
    DuplicateRole,
    DuplicateUserName,
    DuplicateEmail,
    InvalidUserName,
    InvalidEmail,
    FieldRequired,
    FieldTooShort,
    PasswordTooShort,
    PasswordRequiresNonAlphanumeric,
    PasswordRequiresDigit,
    PasswordRequiresLower,
    PasswordRequiresUpper,
    PasswordRequiresUniqueChars,
}

impl MessageKey {
    pub const ALL: [MessageKey; 24] = [
        MessageKey::InvalidRequest,
        MessageKey::DefaultError,
        MessageKey::RegisterSucceeded,
        MessageKey::LoginSucceeded,
        MessageKey::RoleCreated,
        MessageKey::RoleAssigned,
        MessageKey::PasswordChanged,
        MessageKey::InvalidCredentials,
        MessageKey::LockedOut,
        MessageKey::UserNotFound,
        MessageKey::RoleNotFound,
        MessageKey::DuplicateRole,
        MessageKey::DuplicateUserName,
        MessageKey::DuplicateEmail,
        MessageKey::InvalidUserName,
        MessageKey::InvalidEmail,
        MessageKey::FieldRequired,
        MessageKey::FieldTooShort,
        MessageKey::PasswordTooShort,
        MessageKey::PasswordRequiresNonAlphanumeric,
        MessageKey::PasswordRequiresDigit,
        MessageKey::PasswordRequiresLower,
        MessageKey::PasswordRequiresUpper,
        MessageKey::PasswordRequiresUniqueChars,
    ];

    fn turkish(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Geçersiz istek.",
            Self::DefaultError => "Bilinmeyen bir hata oluştu.",
            Self::RegisterSucceeded => "Kayıt başarılı.",
            Self::LoginSucceeded => "Giriş başarılı.",
            Self::RoleCreated => "Rol oluşturuldu.",
            Self::RoleAssigned => "Rol kullanıcıya atandı.",
            Self::PasswordChanged => "Parola değiştirildi.",
            Self::InvalidCredentials => "E‑posta veya parola hatalı.",
            Self::LockedOut => "Hesabınız kilitlendi. Lütfen daha sonra tekrar deneyin.",
            Self::UserNotFound => "Kullanıcı bulunamadı.",
            Self::RoleNotFound => "Rol bulunamadı.",
            Self::DuplicateRole => "Rol zaten mevcut.",
            Self::DuplicateUserName => "'{user_name}' kullanıcı adı zaten alınmış.",
            Self::DuplicateEmail => "'{email}' e‑posta adresi zaten kayıtlı.",
            Self::InvalidUserName => "Geçersiz kullanıcı adı: {user_name}.",
            Self::InvalidEmail => "Geçersiz e‑posta adresi: {email}.",
            Self::FieldRequired => "{field} alanı zorunludur.",
            Self::FieldTooShort => "{field} alanı en az {min} karakter olmalıdır.",
            Self::PasswordTooShort => "Parola en az {length} karakter olmalıdır.",
            Self::PasswordRequiresNonAlphanumeric => "Parola en az bir özel karakter içermelidir.",
            Self::PasswordRequiresDigit => "Parola en az bir rakam içermelidir.",
            Self::PasswordRequiresLower => "Parola en az bir küçük harf içermelidir.",
            Self::PasswordRequiresUpper => "Parola en az bir büyük harf içermelidir.",
            Self::PasswordRequiresUniqueChars => "Parola en az {count} farklı karakter içermelidir.",
        }
    }

    fn english(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request.",
            Self::DefaultError => "An unknown failure has occurred.",
            Self::RegisterSucceeded => "Registration successful.",
            Self::LoginSucceeded => "Login successful.",
            Self::RoleCreated => "Role created.",
            Self::RoleAssigned => "Role assigned to user.",
            Self::PasswordChanged => "Password changed.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::LockedOut => "Your account is locked. Please try again later.",
            Self::UserNotFound => "User not found.",
            Self::RoleNotFound => "Role not found.",
            Self::DuplicateRole => "Role already exists.",
            Self::DuplicateUserName => "Username '{user_name}' is already taken.",
            Self::DuplicateEmail => "Email '{email}' is already taken.",
            Self::InvalidUserName => {
                "Username '{user_name}' is invalid, can only contain letters or digits."
            }
            Self::InvalidEmail => "Email '{email}' is invalid.",
            Self::FieldRequired => "The {field} field is required.",
            Self::FieldTooShort => "The {field} field must be at least {min} characters.",
            Self::PasswordTooShort => "Passwords must be at least {length} characters.",
            Self::PasswordRequiresNonAlphanumeric => {
                "Passwords must have at least one non alphanumeric character."
            }
            Self::PasswordRequiresDigit => "Passwords must have at least one digit ('0'-'9').",
            Self::PasswordRequiresLower => "Passwords must have at least one lowercase ('a'-'z').",
            Self::PasswordRequiresUpper => "Passwords must have at least one uppercase ('A'-'Z').",
            Self::PasswordRequiresUniqueChars => {
                "Passwords must use at least {count} different characters."
            }
        }
    }
}

/// Resolved catalog for one locale plus overrides.
#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<MessageKey, String>,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        let entries = MessageKey::ALL
            .iter()
            .map(|key| {
                let text = match locale {
                    Locale::Tr => key.turkish(),
                    Locale::En => key.english(),
                };
                (*key, text.to_string())
            })
            .collect();
        Self { entries }
    }

    /// Replace individual entries, e.g. from `[i18n.overrides]`.
    pub fn with_overrides(mut self, overrides: &HashMap<MessageKey, String>) -> Self {
        for (key, text) in overrides {
            self.entries.insert(*key, text.clone());
        }
        self
    }

    /// Raw template for `key`.
    pub fn text(&self, key: MessageKey) -> &str {
        self.entries
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.turkish())
    }

    /// Template for `key` with every `{name}` placeholder substituted.
    pub fn render(&self, key: MessageKey, args: &[(&str, String)]) -> String {
        let mut out = self.text(key).to_string();
        for (name, value) in args {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    pub fn violation(&self, violation: &Violation) -> String {
        match violation {
            Violation::Required { field } => {
                self.render(MessageKey::FieldRequired, &[("field", field.to_string())])
            }
            Violation::InvalidUserName { value } => {
                self.render(MessageKey::InvalidUserName, &[("user_name", value.clone())])
            }
            Violation::InvalidEmail { value } => {
                self.render(MessageKey::InvalidEmail, &[("email", value.clone())])
            }
            Violation::TooShort { field, min } => {
                self.render(
                    MessageKey::FieldTooShort,
                    &[("field", field.to_string()), ("min", min.to_string())],
                )
            }
            Violation::Password(p) => self.policy(p),
        }
    }

    fn policy(&self, violation: &PolicyViolation) -> String {
        match violation {
            PolicyViolation::TooShort { min } => {
                self.render(MessageKey::PasswordTooShort, &[("length", min.to_string())])
            }
            PolicyViolation::RequiresNonAlphanumeric => {
                self.text(MessageKey::PasswordRequiresNonAlphanumeric).to_string()
            }
            PolicyViolation::RequiresDigit => self.text(MessageKey::PasswordRequiresDigit).to_string(),
            PolicyViolation::RequiresLower => self.text(MessageKey::PasswordRequiresLower).to_string(),
            PolicyViolation::RequiresUpper => self.text(MessageKey::PasswordRequiresUpper).to_string(),
            PolicyViolation::RequiresUniqueChars { min } => {
                self.render(MessageKey::PasswordRequiresUniqueChars, &[("count", min.to_string())])
            }
        }
    }

    /// Client-facing error list for a domain error.
    pub fn error(&self, err: &DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(violations) => {
                let list: Vec<String> = violations.iter().map(|v| self.violation(v)).collect();
                if list.is_empty() {
                    vec![self.text(MessageKey::InvalidRequest).to_string()]
                } else {
                    list
                }
            }
            // The email is also the user name, so both uniqueness rules fire.
            DomainError::DuplicateEmail(email) => vec![
                self.render(MessageKey::DuplicateUserName, &[("user_name", email.clone())]),
                self.render(MessageKey::DuplicateEmail, &[("email", email.clone())]),
            ],
            DomainError::DuplicateRole(_) => vec![self.text(MessageKey::DuplicateRole).to_string()],
            DomainError::UserNotFound(_) => vec![self.text(MessageKey::UserNotFound).to_string()],
            DomainError::RoleNotFound(_) => vec![self.text(MessageKey::RoleNotFound).to_string()],
            DomainError::InvalidCredentials => {
                vec![self.text(MessageKey::InvalidCredentials).to_string()]
            }
            DomainError::LockedOut { .. } => vec![self.text(MessageKey::LockedOut).to_string()],
            DomainError::Storage(_) => vec![self.text(MessageKey::DefaultError).to_string()],
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

//! Authentication DTOs
//!
//! Fields are optional at the serde level so that a missing field is
//! reported as a validation message instead of a JSON rejection.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Violation;
use crate::shared::{required, required_email, required_min_length, ValidateRequest};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    #[schema(example = "Abc123")]
    pub password: Option<String>,
}

impl ValidateRequest for RegisterRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            required_email("email", self.email.as_deref()),
            required("password", self.password.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Accepted for compatibility; no session is issued.
    #[serde(default)]
    pub remember_me: bool,
}

impl ValidateRequest for LoginRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            required_email("email", self.email.as_deref()),
            required("password", self.password.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[schema(example = "Admin")]
    pub name: Option<String>,
}

impl ValidateRequest for CreateRoleRequest {
    fn violations(&self) -> Vec<Violation> {
        required_min_length("name", self.name.as_deref(), 2)
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub email: Option<String>,
    pub role_name: Option<String>,
}

impl ValidateRequest for AssignRoleRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            required_email("email", self.email.as_deref()),
            required("roleName", self.role_name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl ValidateRequest for ChangePasswordRequest {
    fn violations(&self) -> Vec<Violation> {
        [
            required_email("email", self.email.as_deref()),
            required("currentPassword", self.current_password.as_deref()),
            required("newPassword", self.new_password.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserRolesResponse {
    pub email: String,
    pub roles: Vec<String>,
}

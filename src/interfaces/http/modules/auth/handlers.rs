//! Authentication API handlers

use std::sync::Arc;

use axum::extract::{FromRef, Path, State};
use axum::Json;
use tracing::info;

use super::dto::{
    AssignRoleRequest, ChangePasswordRequest, CreateRoleRequest, LoginRequest, RegisterRequest,
    UserRolesResponse,
};
use crate::application::{CredentialVerifier, RoleService};
use crate::interfaces::http::common::{ApiError, ErrorResponse, MessageResponse, ValidatedJson};
use crate::shared::{MessageKey, Messages};

/// Auth state
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<CredentialVerifier>,
    pub roles: Arc<RoleService>,
    pub messages: Arc<Messages>,
}

impl FromRef<AuthState> for Arc<Messages> {
    fn from_ref(s: &AuthState) -> Self {
        Arc::clone(&s.messages)
    }
}

impl AuthState {
    fn ok(&self, key: MessageKey) -> Json<MessageResponse> {
        Json(MessageResponse::new(self.messages.text(key)))
    }

    fn fail(&self, err: crate::domain::DomainError) -> ApiError {
        ApiError::from_domain(&self.messages, err)
    }
}

type ApiResult = Result<Json<MessageResponse>, ApiError>;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 400, description = "Validation error or email taken", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    state
        .verifier
        .register(&email, &password)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(state.ok(MessageKey::RegisterSucceeded))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials or account locked out", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = state
        .verifier
        .authenticate(&email, &password)
        .await
        .map_err(|e| state.fail(e))?;

    info!(user_id = %user.id, remember_me = request.remember_me, "Login accepted");
    Ok(state.ok(MessageKey::LoginSucceeded))
}

#[utoipa::path(
    post,
    path = "/api/auth/role",
    tag = "Roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = MessageResponse),
        (status = 400, description = "Validation error or role exists", body = ErrorResponse)
    )
)]
pub async fn create_role(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<CreateRoleRequest>,
) -> ApiResult {
    let name = request.name.unwrap_or_default();

    state
        .roles
        .create_role(&name)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(state.ok(MessageKey::RoleCreated))
}

#[utoipa::path(
    post,
    path = "/api/auth/assign-role",
    tag = "Roles",
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned (or already held)", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    )
)]
pub async fn assign_role(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<AssignRoleRequest>,
) -> ApiResult {
    let email = request.email.unwrap_or_default();
    let role_name = request.role_name.unwrap_or_default();

    state
        .roles
        .assign_role(&email, &role_name)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(state.ok(MessageKey::RoleAssigned))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Authentication",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials or account locked out", body = ErrorResponse)
    )
)]
pub async fn change_password(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult {
    let email = request.email.unwrap_or_default();
    let current = request.current_password.unwrap_or_default();
    let new = request.new_password.unwrap_or_default();

    state
        .verifier
        .change_password(&email, &current, &new)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(state.ok(MessageKey::PasswordChanged))
}

#[utoipa::path(
    get,
    path = "/api/auth/users/{email}/roles",
    tag = "Roles",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Roles held by the user", body = UserRolesResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn list_user_roles(
    State(state): State<AuthState>,
    Path(email): Path<String>,
) -> Result<Json<UserRolesResponse>, ApiError> {
    let roles = state
        .roles
        .roles_for_email(&email)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Json(UserRolesResponse { email, roles }))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::{LockoutPolicy, PasswordPolicy};
    use crate::infrastructure::{InMemoryIdentityStore, PasswordHasher};
    use crate::interfaces::http::router::auth_routes;
    use crate::shared::Locale;

    fn app() -> Router {
        let store = Arc::new(InMemoryIdentityStore::new());
        let verifier = CredentialVerifier::new(
            store.clone(),
            PasswordHasher::new(4),
            PasswordPolicy::default(),
            LockoutPolicy::default(),
        );
        let state = AuthState {
            verifier: Arc::new(verifier),
            roles: Arc::new(RoleService::new(store.clone(), store)),
            messages: Arc::new(Messages::new(Locale::Tr)),
        };
        Router::new().nest("/api/auth", auth_routes(state))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        call(app, "POST", uri, Some(body)).await
    }

    #[tokio::test]
    async fn register_twice_reports_duplicate_email() {
        let app = app();
        let body = json!({"email": "a@x.com", "password": "Abc123"});

        let (status, resp) = post(&app, "/api/auth/register", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "Kayıt başarılı.");

        let (status, resp) = post(&app, "/api/auth/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["errors"][0], "'a@x.com' kullanıcı adı zaten alınmış.");
        assert_eq!(resp["errors"][1], "'a@x.com' e‑posta adresi zaten kayıtlı.");
    }

    #[tokio::test]
    async fn register_reports_policy_violations() {
        let app = app();
        let (status, resp) = post(
            &app,
            "/api/auth/register",
            json!({"email": "a@x.com", "password": "abc"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_request() {
        let app = app();
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from("{nope"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_locks_out_after_five_failures() {
        let app = app();
        post(&app, "/api/auth/register", json!({"email": "a@x.com", "password": "Abc123"})).await;

        let wrong = json!({"email": "a@x.com", "password": "wrong1"});
        for _ in 0..4 {
            let (status, resp) = post(&app, "/api/auth/login", wrong.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(resp["errors"][0], "E‑posta veya parola hatalı.");
        }

        let (status, resp) = post(&app, "/api/auth/login", wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp["errors"][0],
            "Hesabınız kilitlendi. Lütfen daha sonra tekrar deneyin."
        );

        let (status, _) = post(
            &app,
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "Abc123", "rememberMe": true}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let app = app();
        post(&app, "/api/auth/register", json!({"email": "a@x.com", "password": "Abc123"})).await;

        let (status, resp) = post(
            &app,
            "/api/auth/login",
            json!({"email": "A@X.com", "password": "Abc123"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "Giriş başarılı.");
    }

    #[tokio::test]
    async fn role_creation_and_assignment() {
        let app = app();
        post(&app, "/api/auth/register", json!({"email": "a@x.com", "password": "Abc123"})).await;

        let (status, _) = post(&app, "/api/auth/role", json!({"name": "Admin"})).await;
        assert_eq!(status, StatusCode::OK);

        let (status, resp) = post(&app, "/api/auth/role", json!({"name": "Admin"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["errors"][0], "Rol zaten mevcut.");

        let assign = json!({"email": "a@x.com", "roleName": "Admin"});
        let (status, resp) = post(&app, "/api/auth/assign-role", assign.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "Rol kullanıcıya atandı.");

        // Already held: same success
        let (status, _) = post(&app, "/api/auth/assign-role", assign).await;
        assert_eq!(status, StatusCode::OK);

        let (status, resp) = call(&app, "GET", "/api/auth/users/a@x.com/roles", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["roles"], json!(["Admin"]));
    }

    #[tokio::test]
    async fn assign_role_not_found_cases() {
        let app = app();
        post(&app, "/api/auth/register", json!({"email": "a@x.com", "password": "Abc123"})).await;
        post(&app, "/api/auth/role", json!({"name": "Admin"})).await;

        let (status, resp) = post(
            &app,
            "/api/auth/assign-role",
            json!({"email": "ghost@x.com", "roleName": "Admin"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp["errors"][0], "Kullanıcı bulunamadı.");

        let (status, resp) = post(
            &app,
            "/api/auth/assign-role",
            json!({"email": "a@x.com", "roleName": "Ghost"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp["errors"][0], "Rol bulunamadı.");
    }

    #[tokio::test]
    async fn short_role_name_is_rejected() {
        let app = app();
        let (status, _) = post(&app, "/api/auth/role", json!({"name": "A"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn change_password_flow() {
        let app = app();
        post(&app, "/api/auth/register", json!({"email": "a@x.com", "password": "Abc123"})).await;

        let (status, _) = post(
            &app,
            "/api/auth/change-password",
            json!({"email": "a@x.com", "currentPassword": "bad123", "newPassword": "Xyz789"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, resp) = post(
            &app,
            "/api/auth/change-password",
            json!({"email": "a@x.com", "currentPassword": "Abc123", "newPassword": "Xyz789"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "Parola değiştirildi.");

        let (status, _) = post(
            &app,
            "/api/auth/login",
            json!({"email": "a@x.com", "password": "Xyz789"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_user_roles_is_not_found() {
        let app = app();
        let (status, _) = call(&app, "GET", "/api/auth/users/ghost@x.com/roles", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

//! API router with Swagger documentation

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ErrorResponse, MessageResponse};
use super::modules::auth::{self, AuthState};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;

/// Everything the HTTP layer needs, split per feature via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub auth: AuthState,
    pub health: HealthState,
    pub metrics: MetricsState,
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        s.health.clone()
    }
}

impl FromRef<ApiState> for MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        s.metrics.clone()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::create_role,
        auth::assign_role,
        auth::change_password,
        auth::list_user_roles,
    ),
    components(
        schemas(
            MessageResponse,
            ErrorResponse,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::CreateRoleRequest,
            auth::AssignRoleRequest,
            auth::ChangePasswordRequest,
            auth::UserRolesResponse,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Registration, login with lockout, password change"),
        (name = "Roles", description = "Role creation and assignment"),
    ),
    info(
        title = "Identity API",
        version = "1.0.0",
        description = "Registration, login, roles and role assignment",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// `/api/auth/*` routes
pub(crate) fn auth_routes(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/role", post(auth::create_role))
        .route("/assign-role", post(auth::assign_role))
        .route("/change-password", post(auth::change_password))
        .route("/users/{email}/roles", get(auth::list_user_roles))
        .with_state(state)
}

pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state.clone());

    Router::new()
        .merge(swagger_routes)
        .merge(api_routes)
        .nest("/api/auth", auth_routes(state.auth))
        .route_layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use super::*;
    use crate::application::{CredentialVerifier, LockoutPolicy, PasswordPolicy, RoleService};
    use crate::infrastructure::{InMemoryIdentityStore, PasswordHasher};
    use crate::shared::Messages;

    fn app() -> Router {
        let store = Arc::new(InMemoryIdentityStore::new());
        let verifier = CredentialVerifier::new(
            store.clone(),
            PasswordHasher::new(4),
            PasswordPolicy::default(),
            LockoutPolicy::default(),
        );
        create_api_router(ApiState {
            auth: AuthState {
                verifier: Arc::new(verifier),
                roles: Arc::new(RoleService::new(store.clone(), store)),
                messages: Arc::new(Messages::default()),
            },
            health: HealthState {
                db: None,
                started_at: Arc::new(Instant::now()),
            },
            metrics: MetricsState {
                handle: PrometheusBuilder::new().build_recorder().handle(),
            },
        })
    }

    async fn fetch(uri: &str) -> axum::response::Response {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_served() {
        let resp = fetch("/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn metrics_are_served_as_text() {
        let resp = fetch("/metrics").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn openapi_document_lists_auth_paths() {
        let resp = fetch("/api-doc/openapi.json").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/auth/register"].is_object());
        assert!(doc["paths"]["/api/auth/assign-role"].is_object());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        assert_eq!(fetch("/nope").await.status(), StatusCode::NOT_FOUND);
    }
}

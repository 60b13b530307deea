//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! [`ValidateRequest::validate`] on the deserialized value. Both malformed
//! JSON and validation failures produce a 400 with a localized
//! `{ "errors": [...] }` body.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest};
use axum::Json;
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::shared::{Messages, ValidateRequest};

/// An extractor that deserializes JSON and validates it.
///
/// The router state must provide the message catalog via `FromRef`.
///
/// ```ignore
/// async fn handler(ValidatedJson(body): ValidatedJson<RegisterRequest>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + ValidateRequest,
    S: Send + Sync,
    Arc<Messages>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let messages = Arc::<Messages>::from_ref(state);

        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "Rejected request body");
            ApiError::invalid_request(&messages)
        })?;

        value
            .validate()
            .map_err(|err| ApiError::from_domain(&messages, err))?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    use crate::domain::Violation;
    use crate::shared::{required, required_min_length, Locale};

    #[derive(Debug, Deserialize)]
    struct TestBody {
        name: Option<String>,
    }

    impl ValidateRequest for TestBody {
        fn violations(&self) -> Vec<Violation> {
            [required_min_length("name", self.name.as_deref(), 2)]
                .into_iter()
                .flatten()
                .collect()
        }
    }

    #[derive(Debug, Deserialize)]
    struct TwoFields {
        a: Option<String>,
        b: Option<String>,
    }

    impl ValidateRequest for TwoFields {
        fn violations(&self) -> Vec<Violation> {
            [required("a", self.a.as_deref()), required("b", self.b.as_deref())]
                .into_iter()
                .flatten()
                .collect()
        }
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    async fn two(ValidatedJson(_body): ValidatedJson<TwoFields>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/test", post(handler))
            .route("/two", post(two))
            .with_state(Arc::new(Messages::new(Locale::En)))
    }

    async fn send(uri: &str, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let (status, _) = send("/test", r#"{"name":"Admin"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400_invalid_request() {
        let (status, body) = send("/test", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0], "Invalid request.");
    }

    #[tokio::test]
    async fn validation_failure_returns_400_with_messages() {
        let (status, body) = send("/test", r#"{"name":"A"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["errors"][0],
            "The name field must be at least 2 characters."
        );
    }

    #[tokio::test]
    async fn all_violations_are_reported() {
        let (status, body) = send("/two", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }
}

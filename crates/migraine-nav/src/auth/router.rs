use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::{bearer_token, AuthError, AuthService, Credentials};

pub fn auth_router(auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/session", get(session_handler))
        .with_state(auth)
}

pub(crate) fn auth_error_response(err: AuthError) -> Response {
    let status = match err {
        AuthError::InvalidCredentials | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
        AuthError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
}

pub(crate) async fn login_handler(
    State(auth): State<Arc<AuthService>>,
    axum::Json(credentials): axum::Json<Credentials>,
) -> Response {
    match auth.login(&credentials.email, &credentials.password) {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => auth_error_response(err),
    }
}

pub(crate) async fn logout_handler(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    let result = bearer_token(&headers)
        .ok_or(AuthError::InvalidSession)
        .and_then(|token| auth.logout(token));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => auth_error_response(err),
    }
}

pub(crate) async fn session_handler(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    match auth.authenticate_headers(&headers) {
        Ok(user) => (StatusCode::OK, axum::Json(json!({ "user": user }))).into_response(),
        Err(err) => auth_error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn login_then_session_then_logout() {
        let router = auth_router(Arc::new(AuthService::default()));

        let login = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "demo@migrainenav.app", "password": "demo1234" }).to_string(),
            ))
            .expect("request builds");
        let response = router.clone().oneshot(login).await.expect("login responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(
            &to_bytes(response.into_body(), usize::MAX).await.expect("body"),
        )
        .expect("json");
        let token = body["token"].as_str().expect("token").to_string();

        let bearer = format!("Bearer {token}");
        let session = Request::builder()
            .uri("/api/v1/auth/session")
            .header(header::AUTHORIZATION, bearer.as_str())
            .body(Body::empty())
            .expect("request builds");
        let response = router.clone().oneshot(session).await.expect("session responds");
        assert_eq!(response.status(), StatusCode::OK);

        let logout = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/logout")
            .header(header::AUTHORIZATION, bearer.as_str())
            .body(Body::empty())
            .expect("request builds");
        let response = router.clone().oneshot(logout).await.expect("logout responds");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let stale = Request::builder()
            .uri("/api/v1/auth/session")
            .header(header::AUTHORIZATION, bearer.as_str())
            .body(Body::empty())
            .expect("request builds");
        let response = router.oneshot(stale).await.expect("session responds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let router = auth_router(Arc::new(AuthService::default()));
        let login = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "demo@migrainenav.app", "password": "nope" }).to_string(),
            ))
            .expect("request builds");
        let response = router.oneshot(login).await.expect("login responds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

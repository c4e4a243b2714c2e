use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use migraine_nav::auth::auth_router;
use migraine_nav::diary::{diary_router, DiaryState};
use migraine_nav::directory::directory_router;
use migraine_nav::integrations::integrations_router;
use migraine_nav::prior_auth::prior_auth_router;
use migraine_nav::store::store_router;
use serde_json::json;

pub(crate) fn app_routes(services: Services) -> Router {
    let Services {
        estimator,
        diary,
        auth,
        preferences,
        plans,
        integrations,
    } = services;

    prior_auth_router(estimator)
        .merge(diary_router(DiaryState {
            service: diary,
            auth: auth.clone(),
            preferences: preferences.clone(),
        }))
        .merge(auth_router(auth))
        .merge(store_router(preferences, plans))
        .merge(integrations_router(integrations))
        .merge(directory_router())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

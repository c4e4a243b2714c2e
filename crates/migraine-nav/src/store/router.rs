use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::plans::{InsurancePlanBook, InsurancePlanDraft, PlanBookError};
use super::preferences::{PreferenceStore, PreferencesPatch};

#[derive(Clone, Debug)]
pub struct StoreState {
    pub preferences: PreferenceStore,
    pub plans: InsurancePlanBook,
}

/// Routes for preferences and the insurance plan book.
pub fn store_router(preferences: PreferenceStore, plans: InsurancePlanBook) -> Router {
    Router::new()
        .route(
            "/api/v1/preferences",
            get(preferences_handler).put(update_preferences_handler),
        )
        .route(
            "/api/v1/insurance/plans",
            get(list_plans_handler).post(add_plan_handler),
        )
        .route("/api/v1/insurance/plans/:plan_id", delete(remove_plan_handler))
        .route(
            "/api/v1/insurance/plans/:plan_id/primary",
            post(set_primary_handler),
        )
        .with_state(StoreState { preferences, plans })
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn plan_error_response(err: PlanBookError) -> Response {
    let status = match err {
        PlanBookError::Invalid(_) => StatusCode::BAD_REQUEST,
        PlanBookError::NotFound(_) => StatusCode::NOT_FOUND,
        PlanBookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

pub(crate) async fn preferences_handler(State(state): State<StoreState>) -> Response {
    match state.preferences.load() {
        Ok(preferences) => (StatusCode::OK, axum::Json(preferences)).into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) async fn update_preferences_handler(
    State(state): State<StoreState>,
    axum::Json(patch): axum::Json<PreferencesPatch>,
) -> Response {
    match state.preferences.apply(patch) {
        Ok(preferences) => (StatusCode::OK, axum::Json(preferences)).into_response(),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub(crate) async fn list_plans_handler(State(state): State<StoreState>) -> Response {
    match state.plans.list() {
        Ok(plans) => (StatusCode::OK, axum::Json(json!({ "plans": plans }))).into_response(),
        Err(err) => plan_error_response(err),
    }
}

pub(crate) async fn add_plan_handler(
    State(state): State<StoreState>,
    axum::Json(draft): axum::Json<InsurancePlanDraft>,
) -> Response {
    match state.plans.add(draft) {
        Ok(plan) => (StatusCode::CREATED, axum::Json(plan)).into_response(),
        Err(err) => plan_error_response(err),
    }
}

pub(crate) async fn remove_plan_handler(
    State(state): State<StoreState>,
    Path(plan_id): Path<String>,
) -> Response {
    match state.plans.remove(&plan_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => plan_error_response(err),
    }
}

pub(crate) async fn set_primary_handler(
    State(state): State<StoreState>,
    Path(plan_id): Path<String>,
) -> Response {
    match state.plans.set_primary(&plan_id) {
        Ok(plan) => (StatusCode::OK, axum::Json(plan)).into_response(),
        Err(err) => plan_error_response(err),
    }
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{PaLookupError, PaRequestProfile};
use super::PriorAuthEstimator;

/// Routes for PA estimation and the list of covered drugs.
pub fn prior_auth_router(estimator: Arc<PriorAuthEstimator>) -> Router {
    Router::new()
        .route("/api/v1/prior-auth/estimate", post(estimate_handler))
        .route("/api/v1/prior-auth/drugs", get(drugs_handler))
        .with_state(estimator)
}

pub(crate) async fn estimate_handler(
    State(estimator): State<Arc<PriorAuthEstimator>>,
    axum::Json(profile): axum::Json<PaRequestProfile>,
) -> Response {
    match estimator.estimate(&profile) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err @ PaLookupError::UnknownDrug(_)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn drugs_handler(State(estimator): State<Arc<PriorAuthEstimator>>) -> Response {
    let payload = json!({ "drugs": estimator.supported_drugs() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

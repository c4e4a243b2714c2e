use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::{search_insurers, search_pharmacies, search_providers, DirectoryFilter};

pub fn directory_router() -> Router {
    Router::new()
        .route("/api/v1/directory/pharmacies", get(pharmacies_handler))
        .route("/api/v1/directory/providers", get(providers_handler))
        .route("/api/v1/directory/insurers", get(insurers_handler))
}

pub(crate) async fn pharmacies_handler(Query(filter): Query<DirectoryFilter>) -> Response {
    let results = search_pharmacies(&filter);
    (StatusCode::OK, axum::Json(json!({ "results": results }))).into_response()
}

pub(crate) async fn providers_handler(Query(filter): Query<DirectoryFilter>) -> Response {
    let results = search_providers(&filter);
    (StatusCode::OK, axum::Json(json!({ "results": results }))).into_response()
}

pub(crate) async fn insurers_handler(Query(filter): Query<DirectoryFilter>) -> Response {
    let results = search_insurers(&filter);
    (StatusCode::OK, axum::Json(json!({ "results": results }))).into_response()
}

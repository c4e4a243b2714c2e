use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

use super::error::GatewayError;

/// Uniform body returned by every proxy route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ProxyResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub(crate) fn respond<T: Serialize>(operation: &'static str, result: Result<T, GatewayError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, axum::Json(ProxyResponse::ok(data))).into_response(),
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                warn!(operation, error = %err, "gateway call failed");
            }
            let body: ProxyResponse<T> = ProxyResponse::failure(err.to_string());
            (status, axum::Json(body)).into_response()
        }
    }
}

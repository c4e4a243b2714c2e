use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::cms::{PlanCatalog, PlanSearch};
use super::envelope::respond;
use super::error::GatewayError;
use super::llm::{AiAssistant, AnalysisRequest, AppealLetterRequest};
use super::nppes::{ProviderRegistry, ProviderSearch};
use super::openfda::DrugLabelSource;

#[derive(Clone)]
pub struct IntegrationState {
    pub drug_labels: Arc<dyn DrugLabelSource>,
    pub providers: Arc<dyn ProviderRegistry>,
    pub plans: Arc<dyn PlanCatalog>,
    pub assistant: Arc<AiAssistant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugLabelQuery {
    pub drug_name: String,
}

/// Proxy and AI routes; every response uses the `ProxyResponse` envelope.
pub fn integrations_router(state: IntegrationState) -> Router {
    Router::new()
        .route("/api/v1/proxy/drug-label", post(drug_label_handler))
        .route("/api/v1/proxy/providers", post(providers_handler))
        .route("/api/v1/proxy/plans", post(plans_handler))
        .route("/api/v1/ai/analyze", post(analyze_handler))
        .route("/api/v1/ai/appeal-letter", post(appeal_letter_handler))
        .with_state(state)
}

/// Unreadable bodies become `Invalid` so they are answered inside the envelope.
fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| GatewayError::Invalid(rejection.body_text()))
}

pub(crate) async fn drug_label_handler(
    State(state): State<IntegrationState>,
    body: Result<Json<DrugLabelQuery>, JsonRejection>,
) -> Response {
    let result = match payload(body) {
        Ok(query) => state.drug_labels.drug_label(&query.drug_name).await,
        Err(err) => Err(err),
    };
    respond("drug_label", result)
}

pub(crate) async fn providers_handler(
    State(state): State<IntegrationState>,
    body: Result<Json<ProviderSearch>, JsonRejection>,
) -> Response {
    let result = match payload(body) {
        Ok(search) => state.providers.search_providers(&search).await,
        Err(err) => Err(err),
    };
    respond("provider_search", result)
}

pub(crate) async fn plans_handler(
    State(state): State<IntegrationState>,
    body: Result<Json<PlanSearch>, JsonRejection>,
) -> Response {
    let result = match payload(body) {
        Ok(search) => state.plans.search_plans(&search).await,
        Err(err) => Err(err),
    };
    respond("plan_search", result)
}

pub(crate) async fn analyze_handler(
    State(state): State<IntegrationState>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let result = match payload(body) {
        Ok(request) => state.assistant.analyze(&request).await,
        Err(err) => Err(err),
    };
    respond("ai_analyze", result)
}

pub(crate) async fn appeal_letter_handler(
    State(state): State<IntegrationState>,
    body: Result<Json<AppealLetterRequest>, JsonRejection>,
) -> Response {
    let result = match payload(body) {
        Ok(request) => state
            .assistant
            .appeal_letter(&request)
            .await
            .map(|letter| json!({ "letter": letter })),
        Err(err) => Err(err),
    };
    respond("ai_appeal_letter", result)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::integrations::{ChatGateway, DrugLabel, MarketplacePlan, Provider};

    struct StubLabels;

    #[async_trait]
    impl DrugLabelSource for StubLabels {
        async fn drug_label(&self, drug_name: &str) -> Result<DrugLabel, GatewayError> {
            if drug_name.eq_ignore_ascii_case("nurtec") {
                Ok(DrugLabel {
                    brand_name: Some("NURTEC ODT".to_string()),
                    generic_name: Some("RIMEGEPANT".to_string()),
                    manufacturer: None,
                    route: vec!["ORAL".to_string()],
                    indications: Some("Acute treatment of migraine.".to_string()),
                    dosage: None,
                    warnings: None,
                    contraindications: None,
                    adverse_reactions: None,
                })
            } else {
                Err(GatewayError::NotFound(format!("no FDA label found for '{drug_name}'")))
            }
        }
    }

    struct StubProviders;

    #[async_trait]
    impl ProviderRegistry for StubProviders {
        async fn search_providers(&self, _search: &ProviderSearch) -> Result<Vec<Provider>, GatewayError> {
            Err(GatewayError::Upstream {
                status: 503,
                body: "maintenance".to_string(),
            })
        }
    }

    struct StubPlans;

    #[async_trait]
    impl PlanCatalog for StubPlans {
        async fn search_plans(&self, search: &PlanSearch) -> Result<Vec<MarketplacePlan>, GatewayError> {
            search.validated_zip()?;
            Ok(Vec::new())
        }
    }

    struct UnconfiguredChat;

    #[async_trait]
    impl ChatGateway for UnconfiguredChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, GatewayError> {
            Err(GatewayError::NotConfigured("LLM gateway API key"))
        }
    }

    fn router() -> Router {
        integrations_router(IntegrationState {
            drug_labels: Arc::new(StubLabels),
            providers: Arc::new(StubProviders),
            plans: Arc::new(StubPlans),
            assistant: Arc::new(AiAssistant::new(Arc::new(UnconfiguredChat))),
        })
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");
        let response = router().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn drug_label_success_is_enveloped() {
        let (status, body) = post_json("/api/v1/proxy/drug-label", json!({ "drugName": "Nurtec" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["genericName"], "RIMEGEPANT");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn failures_keep_the_envelope_shape() {
        let (status, body) = post_json("/api/v1/proxy/drug-label", json!({ "drugName": "Unknown" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());

        let (status, body) = post_json("/api/v1/proxy/providers", json!({ "lastName": "Smith" })).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().expect("error").contains("503"));

        let (status, body) = post_json("/api/v1/proxy/plans", json!({ "zipcode": "123" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = post_json(
            "/api/v1/ai/appeal-letter",
            json!({
                "drugName": "Aimovig",
                "insurancePlanType": "commercial",
                "patientSummary": "Failed two preventives."
            }),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "LLM gateway API key is not configured");
    }

    #[tokio::test]
    async fn unreadable_bodies_are_enveloped_bad_requests() {
        let (status, body) = post_json("/api/v1/proxy/drug-label", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().expect("error").contains("drugName"));

        let (status, body) = post_json("/api/v1/ai/analyze", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid request: at least one diary entry is required");

        let (status, body) = post_json("/api/v1/ai/analyze", json!({ "entries": "not a list" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/proxy/plans")
            .body(Body::from("zipcode=94110"))
            .expect("request builds");
        let response = router().oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], false);
    }
}

use super::common::*;
use axum::http::StatusCode;
use std::sync::Arc;
use tower::ServiceExt;

use crate::prior_auth::{prior_auth_router, PriorAuthEstimator};

fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn estimate_route_accepts_camel_case_payloads() {
    let router = prior_auth_router(Arc::new(PriorAuthEstimator::new()));
    let response = router
        .oneshot(post_json(
            "/api/v1/prior-auth/estimate",
            serde_json::json!({
                "drugName": "Sumatriptan",
                "migraineDaysPerMonth": 12,
                "insurancePlanType": "Commercial",
                "stepTherapyComplete": true,
                "previousDrugsTried": ["Topiramate", "Propranolol", "Amitriptyline"],
                "priorPaHistory": "never",
                "clinicalNotes": ""
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["score"].as_f64(), Some(95.0));
    assert_eq!(payload["baseRate"].as_f64(), Some(76.6));
    assert_eq!(payload["lookup"]["typicalRequirements"]["minMigraineDays"], 6);
    assert_eq!(payload["dataBasis"], "commercial");
    assert!(payload["factors"].as_array().is_some_and(|f| f.len() == 4));
}

#[tokio::test]
async fn estimate_route_returns_not_found_for_unknown_drug() {
    let router = prior_auth_router(Arc::new(PriorAuthEstimator::new()));
    let response = router
        .oneshot(post_json(
            "/api/v1/prior-auth/estimate",
            serde_json::json!({ "drugName": "Excedrin", "insurancePlanType": "commercial" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().unwrap_or_default().contains("Excedrin"));
}

#[tokio::test]
async fn drugs_route_lists_table_entries() {
    let router = prior_auth_router(Arc::new(PriorAuthEstimator::new()));
    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/prior-auth/drugs")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let drugs = payload["drugs"].as_array().expect("drug list");
    assert!(drugs.iter().any(|drug| drug == "Sumatriptan"));
    assert!(drugs.iter().any(|drug| drug == "Nurtec ODT"));
}

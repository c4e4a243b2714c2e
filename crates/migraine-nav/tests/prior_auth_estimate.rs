//! End-to-end checks of the prior-authorization estimator through its public facade and router.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use migraine_nav::prior_auth::{
    prior_auth_router, PaLookupError, PaRequestProfile, PriorAuthEstimator, PriorPaHistory,
};

fn profile(drug: &str, plan: &str) -> PaRequestProfile {
    PaRequestProfile {
        drug_name: drug.to_string(),
        migraine_days_per_month: Some(10),
        insurance_plan_type: plan.to_string(),
        step_therapy_complete: true,
        previous_drugs_tried: ["Topiramate", "Propranolol"]
            .into_iter()
            .map(str::to_string)
            .collect::<BTreeSet<_>>(),
        prior_pa_history: PriorPaHistory::Never,
        clinical_notes: "Neurologist letter attached.".to_string(),
    }
}

#[test]
fn every_supported_drug_estimates_within_bounds_for_every_plan() {
    let estimator = PriorAuthEstimator::new();
    let drugs = estimator.supported_drugs();
    assert!(drugs.contains(&"Sumatriptan"));

    for drug in drugs {
        for plan in ["commercial", "medicare", "medicaid", "marketplace", "Employer PPO"] {
            let result = estimator
                .estimate(&profile(drug, plan))
                .expect("every listed drug has commercial data");
            assert!((5.0..=95.0).contains(&result.score), "{drug}/{plan}");
            assert!(!result.recommendations.is_empty(), "{drug}/{plan}");
            assert_eq!(result.lookup.drug, drug);
        }
    }
}

#[test]
fn drug_names_are_trimmed_but_not_fuzzy_matched() {
    let estimator = PriorAuthEstimator::new();
    assert!(estimator.estimate(&profile("  Aimovig ", "commercial")).is_ok());
    assert_eq!(
        estimator.estimate(&profile("aimovig", "commercial")),
        Err(PaLookupError::UnknownDrug("aimovig".to_string()))
    );
}

#[tokio::test]
async fn http_estimate_reports_data_basis() {
    let router = prior_auth_router(Arc::new(PriorAuthEstimator::new()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/prior-auth/estimate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "drugName": "Sumatriptan",
                "migraineDaysPerMonth": 8,
                "insurancePlanType": "Marketplace",
                "stepTherapyComplete": false,
                "previousDrugsTried": ["Topiramate"],
                "priorPaHistory": "pending",
                "clinicalNotes": ""
            })
            .to_string(),
        ))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(
        &to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable"),
    )
    .expect("json body");

    assert_eq!(body["dataBasis"], "commercial");
    assert_eq!(body["baseRate"], 76.6);
    assert!(body["factors"]
        .as_array()
        .expect("factors")
        .iter()
        .any(|factor| factor["label"] == "Prior authorization history" && factor["impact"] == -3));
}

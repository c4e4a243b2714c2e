use std::collections::BTreeSet;

use axum::response::Response;
use serde_json::Value;

use crate::prior_auth::{PaRequestProfile, PriorPaHistory};

pub(super) fn tried(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Sumatriptan on a commercial plan meeting every typical requirement.
pub(super) fn strong_profile() -> PaRequestProfile {
    PaRequestProfile {
        drug_name: "Sumatriptan".to_string(),
        migraine_days_per_month: Some(12),
        insurance_plan_type: "commercial".to_string(),
        step_therapy_complete: true,
        previous_drugs_tried: tried(&["Topiramate", "Propranolol", "Amitriptyline"]),
        prior_pa_history: PriorPaHistory::Never,
        clinical_notes: String::new(),
    }
}

/// Same drug and plan with every requirement unmet.
pub(super) fn weak_profile() -> PaRequestProfile {
    PaRequestProfile {
        migraine_days_per_month: Some(2),
        step_therapy_complete: false,
        previous_drugs_tried: BTreeSet::new(),
        ..strong_profile()
    }
}

pub(super) fn impact_of(result: &crate::prior_auth::PaResult, label: &str) -> Option<i32> {
    result
        .factors
        .iter()
        .find(|factor| factor.label == label)
        .map(|factor| factor.impact)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

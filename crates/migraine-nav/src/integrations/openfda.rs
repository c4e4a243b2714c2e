use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::GatewayError;
use super::http::{build_client, read_json};
use crate::config::GatewayConfig;

/// Condensed openFDA structured product label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugLabel {
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
    pub route: Vec<String>,
    pub indications: Option<String>,
    pub dosage: Option<String>,
    pub warnings: Option<String>,
    pub contraindications: Option<String>,
    pub adverse_reactions: Option<String>,
}

#[async_trait]
pub trait DrugLabelSource: Send + Sync {
    async fn drug_label(&self, drug_name: &str) -> Result<DrugLabel, GatewayError>;
}

pub struct OpenFdaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenFdaClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.openfda_base_url.trim_end_matches('/').to_string(),
            api_key: config.openfda_api_key.clone(),
        })
    }
}

#[async_trait]
impl DrugLabelSource for OpenFdaClient {
    async fn drug_label(&self, drug_name: &str) -> Result<DrugLabel, GatewayError> {
        let drug_name = drug_name.trim();
        if drug_name.is_empty() {
            return Err(GatewayError::Invalid("drugName is required".to_string()));
        }

        let mut query = vec![
            ("search", search_expression(drug_name)),
            ("limit", "1".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.clone()));
        }

        debug!(drug = drug_name, "querying openFDA drug label");
        let response = self
            .client
            .get(format!("{}/drug/label.json", self.base_url))
            .query(&query)
            .send()
            .await?;

        match read_json(response).await {
            Ok(payload) => parse_label(&payload, drug_name),
            Err(GatewayError::Upstream { status: 404, .. }) => Err(not_found(drug_name)),
            Err(err) => Err(err),
        }
    }
}

fn not_found(drug_name: &str) -> GatewayError {
    GatewayError::NotFound(format!("no FDA label found for '{drug_name}'"))
}

pub(crate) fn search_expression(drug_name: &str) -> String {
    let escaped = drug_name.replace('"', "");
    format!("openfda.brand_name:\"{escaped}\" OR openfda.generic_name:\"{escaped}\"")
}

pub(crate) fn parse_label(payload: &Value, drug_name: &str) -> Result<DrugLabel, GatewayError> {
    let label = payload
        .get("results")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| not_found(drug_name))?;
    let openfda = label.get("openfda").unwrap_or(&Value::Null);

    Ok(DrugLabel {
        brand_name: first_string(openfda, "brand_name"),
        generic_name: first_string(openfda, "generic_name"),
        manufacturer: first_string(openfda, "manufacturer_name"),
        route: openfda
            .get("route")
            .and_then(Value::as_array)
            .map(|routes| {
                routes
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        indications: first_paragraph(label, "indications_and_usage"),
        dosage: first_paragraph(label, "dosage_and_administration"),
        warnings: first_paragraph(label, "warnings_and_cautions")
            .or_else(|| first_paragraph(label, "warnings")),
        contraindications: first_paragraph(label, "contraindications"),
        adverse_reactions: first_paragraph(label, "adverse_reactions"),
    })
}

fn first_string(value: &Value, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::Array(items) => items.first()?.as_str()?,
        other => other.as_str()?,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Label sections are arrays of long strings; keep the first paragraph of the first one.
fn first_paragraph(label: &Value, key: &str) -> Option<String> {
    let text = first_string(label, key)?;
    text.split("\n\n")
        .map(str::trim)
        .find(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "meta": { "results": { "total": 3 } },
            "results": [{
                "openfda": {
                    "brand_name": ["IMITREX"],
                    "generic_name": ["SUMATRIPTAN SUCCINATE"],
                    "manufacturer_name": ["GlaxoSmithKline"],
                    "route": ["ORAL"]
                },
                "indications_and_usage": ["1 INDICATIONS AND USAGE Acute treatment of migraine.\n\nLimitations of use: not for prophylaxis."],
                "dosage_and_administration": ["  \n\n25 mg, 50 mg, or 100 mg."],
                "warnings": ["Older warning text."],
                "contraindications": ["History of coronary artery disease."]
            }]
        })
    }

    #[test]
    fn label_maps_first_paragraphs() {
        let label = parse_label(&fixture(), "imitrex").expect("label parses");
        assert_eq!(label.brand_name.as_deref(), Some("IMITREX"));
        assert_eq!(label.generic_name.as_deref(), Some("SUMATRIPTAN SUCCINATE"));
        assert_eq!(label.route, vec!["ORAL".to_string()]);
        assert_eq!(
            label.indications.as_deref(),
            Some("1 INDICATIONS AND USAGE Acute treatment of migraine.")
        );
        assert_eq!(label.dosage.as_deref(), Some("25 mg, 50 mg, or 100 mg."));
        assert_eq!(label.warnings.as_deref(), Some("Older warning text."));
        assert_eq!(label.adverse_reactions, None);
    }

    #[test]
    fn empty_results_are_not_found() {
        let err = parse_label(&json!({ "results": [] }), "nothing").expect_err("no label");
        assert!(matches!(err, GatewayError::NotFound(message) if message.contains("nothing")));
    }

    #[test]
    fn search_matches_brand_or_generic() {
        assert_eq!(
            search_expression("Nurtec \"ODT\""),
            "openfda.brand_name:\"Nurtec ODT\" OR openfda.generic_name:\"Nurtec ODT\""
        );
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::GatewayError;
use super::http::{build_client, read_json, str_field, trimmed};
use crate::config::GatewayConfig;

const NPPES_API_VERSION: &str = "2.1";
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSearch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub taxonomy: Option<String>,
    pub limit: Option<u32>,
}

impl ProviderSearch {
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Registry query parameters; at least one criterion must be present.
    pub(crate) fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, GatewayError> {
        let criteria = [
            ("first_name", trimmed(&self.first_name)),
            ("last_name", trimmed(&self.last_name)),
            ("city", trimmed(&self.city)),
            ("state", trimmed(&self.state)),
            ("postal_code", trimmed(&self.postal_code)),
            ("taxonomy_description", trimmed(&self.taxonomy)),
        ];

        let mut pairs: Vec<(&'static str, String)> = criteria
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value.to_string())))
            .map(|(key, value)| match key {
                "state" => (key, value.to_ascii_uppercase()),
                _ => (key, value),
            })
            .collect();
        if pairs.is_empty() {
            return Err(GatewayError::Invalid(
                "at least one search criterion is required".to_string(),
            ));
        }

        pairs.push(("version", NPPES_API_VERSION.to_string()));
        pairs.push(("limit", self.effective_limit().to_string()));
        Ok(pairs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub npi: String,
    pub name: String,
    pub credential: Option<String>,
    pub taxonomy: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    async fn search_providers(&self, search: &ProviderSearch) -> Result<Vec<Provider>, GatewayError>;
}

pub struct NppesClient {
    client: reqwest::Client,
    base_url: String,
}

impl NppesClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.nppes_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProviderRegistry for NppesClient {
    async fn search_providers(&self, search: &ProviderSearch) -> Result<Vec<Provider>, GatewayError> {
        let query = search.query_pairs()?;
        debug!(criteria = query.len() - 2, "querying NPPES registry");
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&query)
            .send()
            .await?;
        parse_providers(&read_json(response).await?)
    }
}

pub(crate) fn parse_providers(payload: &Value) -> Result<Vec<Provider>, GatewayError> {
    if let Some(errors) = payload.get("Errors").and_then(Value::as_array) {
        let message = errors
            .iter()
            .filter_map(|error| str_field(error, "description"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GatewayError::Invalid(message));
    }

    let Some(results) = payload.get("results") else {
        return Ok(Vec::new());
    };
    let results = results
        .as_array()
        .ok_or_else(|| GatewayError::Decode("results is not an array".to_string()))?;

    Ok(results.iter().filter_map(parse_provider).collect())
}

fn parse_provider(result: &Value) -> Option<Provider> {
    let npi = match result.get("number")? {
        Value::String(number) => number.clone(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    let basic = result.get("basic").unwrap_or(&Value::Null);
    let name = str_field(basic, "organization_name").unwrap_or_else(|| {
        [str_field(basic, "first_name"), str_field(basic, "last_name")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    });

    let taxonomies = result
        .get("taxonomies")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let taxonomy = taxonomies
        .iter()
        .find(|taxonomy| taxonomy.get("primary").and_then(Value::as_bool) == Some(true))
        .or_else(|| taxonomies.first())
        .and_then(|taxonomy| str_field(taxonomy, "desc"));

    let addresses = result
        .get("addresses")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let location = addresses
        .iter()
        .find(|address| {
            address.get("address_purpose").and_then(Value::as_str) == Some("LOCATION")
        })
        .or_else(|| addresses.first());

    Some(Provider {
        npi,
        name,
        credential: str_field(basic, "credential"),
        taxonomy,
        address: location.map(format_address),
        phone: location.and_then(|address| str_field(address, "telephone_number")),
    })
}

fn format_address(address: &Value) -> String {
    let street = [str_field(address, "address_1"), str_field(address, "address_2")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let postal = str_field(address, "postal_code")
        .map(|code| code.chars().take(5).collect::<String>())
        .unwrap_or_default();
    let region = [str_field(address, "state"), Some(postal).filter(|code| !code.is_empty())]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    [Some(street), str_field(address, "city"), Some(region)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::error::GatewayError;
use super::http::{build_client, read_json, str_field};
use crate::config::GatewayConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSearch {
    pub zipcode: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl PlanSearch {
    /// Returns the trimmed ZIP when it is exactly five digits.
    pub fn validated_zip(&self) -> Result<&str, GatewayError> {
        let zip = self.zipcode.trim();
        if zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit()) {
            Ok(zip)
        } else {
            Err(GatewayError::Invalid(format!(
                "zipcode must be 5 digits (got '{zip}')"
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct County {
    pub fips: String,
    pub name: String,
    pub state: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplacePlan {
    pub id: String,
    pub name: String,
    pub issuer: Option<String>,
    pub metal_level: Option<String>,
    pub plan_type: Option<String>,
    pub premium: Option<f64>,
}

#[async_trait]
pub trait PlanCatalog: Send + Sync {
    async fn search_plans(&self, search: &PlanSearch) -> Result<Vec<MarketplacePlan>, GatewayError>;
}

pub struct CmsMarketplaceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CmsMarketplaceClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            base_url: config.cms_base_url.trim_end_matches('/').to_string(),
            api_key: config.cms_api_key.clone(),
        })
    }

    async fn county_for_zip(&self, zip: &str, api_key: &str) -> Result<County, GatewayError> {
        let response = self
            .client
            .get(format!("{}/counties/by/zip/{zip}", self.base_url))
            .query(&[("apikey", api_key)])
            .send()
            .await?;
        parse_county(&read_json(response).await?, zip)
    }
}

#[async_trait]
impl PlanCatalog for CmsMarketplaceClient {
    async fn search_plans(&self, search: &PlanSearch) -> Result<Vec<MarketplacePlan>, GatewayError> {
        let zip = search.validated_zip()?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::NotConfigured("CMS marketplace API key"))?;
        let year = search.year.unwrap_or_else(|| Utc::now().year());

        let county = self.county_for_zip(zip, api_key).await?;
        debug!(zip, county = %county.fips, year, "searching marketplace plans");

        let body = json!({
            "market": "Individual",
            "place": {
                "countyfips": county.fips,
                "state": county.state,
                "zipcode": county.zipcode,
            },
            "year": year,
        });
        let year_param = year.to_string();
        let response = self
            .client
            .post(format!("{}/plans/search", self.base_url))
            .query(&[("apikey", api_key), ("year", year_param.as_str())])
            .json(&body)
            .send()
            .await?;
        parse_plans(&read_json(response).await?)
    }
}

pub(crate) fn parse_county(payload: &Value, zip: &str) -> Result<County, GatewayError> {
    let county = payload
        .get("counties")
        .and_then(Value::as_array)
        .and_then(|counties| counties.first())
        .ok_or_else(|| GatewayError::NotFound(format!("no county found for ZIP {zip}")))?;

    let field = |key: &str| {
        str_field(county, key)
            .ok_or_else(|| GatewayError::Decode(format!("county is missing '{key}'")))
    };
    Ok(County {
        fips: field("fips")?,
        name: field("name")?,
        state: field("state")?,
        zipcode: str_field(county, "zipcode").unwrap_or_else(|| zip.to_string()),
    })
}

pub(crate) fn parse_plans(payload: &Value) -> Result<Vec<MarketplacePlan>, GatewayError> {
    let plans = payload
        .get("plans")
        .and_then(Value::as_array)
        .ok_or_else(|| GatewayError::Decode("response has no plans array".to_string()))?;

    Ok(plans
        .iter()
        .filter_map(|plan| {
            Some(MarketplacePlan {
                id: str_field(plan, "id")?,
                name: str_field(plan, "name")?,
                issuer: plan.get("issuer").and_then(|issuer| str_field(issuer, "name")),
                metal_level: str_field(plan, "metal_level"),
                plan_type: str_field(plan, "type"),
                premium: plan.get("premium").and_then(Value::as_f64),
            })
        })
        .collect())
}

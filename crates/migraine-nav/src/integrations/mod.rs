//! Outbound proxies: openFDA drug labels, the NPPES provider registry, CMS marketplace plans,
//! and an OpenAI-compatible chat gateway for diary analysis and appeal letters.

mod cms;
mod envelope;
mod error;
mod http;
mod llm;
mod nppes;
mod openfda;
pub mod router;

use std::sync::Arc;

pub use cms::{CmsMarketplaceClient, County, MarketplacePlan, PlanCatalog, PlanSearch};
pub use envelope::ProxyResponse;
pub use error::GatewayError;
pub use llm::{
    parse_analysis, strip_code_fences, AiAssistant, AnalysisReport, AnalysisRequest,
    AppealLetterRequest, ChatGateway, OpenAiCompatibleClient,
};
pub use nppes::{NppesClient, Provider, ProviderRegistry, ProviderSearch};
pub use openfda::{DrugLabel, DrugLabelSource, OpenFdaClient};
pub use router::{integrations_router, IntegrationState};

use crate::config::GatewayConfig;

impl IntegrationState {
    /// Wires the live HTTP clients. Missing API keys surface per request as `NotConfigured`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            drug_labels: Arc::new(OpenFdaClient::new(config)?),
            providers: Arc::new(NppesClient::new(config)?),
            plans: Arc::new(CmsMarketplaceClient::new(config)?),
            assistant: Arc::new(AiAssistant::new(Arc::new(OpenAiCompatibleClient::new(
                &config.llm,
                config.timeout,
            )?))),
        })
    }
}

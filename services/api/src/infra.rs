use metrics_exporter_prometheus::PrometheusHandle;
use migraine_nav::auth::AuthService;
use migraine_nav::config::AppConfig;
use migraine_nav::diary::{DiaryService, InMemoryDiaryRepository};
use migraine_nav::error::AppError;
use migraine_nav::integrations::IntegrationState;
use migraine_nav::prior_auth::{PriorAuthEstimator, PriorPaHistory};
use migraine_nav::store::{
    InsurancePlanBook, JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the routers need, built once at startup.
pub(crate) struct Services {
    pub(crate) estimator: Arc<PriorAuthEstimator>,
    pub(crate) diary: Arc<DiaryService<InMemoryDiaryRepository>>,
    pub(crate) auth: Arc<AuthService>,
    pub(crate) preferences: PreferenceStore,
    pub(crate) plans: InsurancePlanBook,
    pub(crate) integrations: IntegrationState,
}

impl Services {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = match &config.storage.path {
            Some(path) => {
                info!(path = %path.display(), "using file-backed preference store");
                Arc::new(JsonFileStore::open(path)?)
            }
            None => Arc::new(MemoryStore::default()),
        };

        Ok(Self::with_parts(
            store,
            IntegrationState::from_config(&config.gateways)?,
        ))
    }

    pub(crate) fn with_parts(store: Arc<dyn KeyValueStore>, integrations: IntegrationState) -> Self {
        Self {
            estimator: Arc::new(PriorAuthEstimator::new()),
            diary: Arc::new(DiaryService::new(Arc::new(
                InMemoryDiaryRepository::default(),
            ))),
            auth: Arc::new(AuthService::with_demo_accounts()),
            preferences: PreferenceStore::new(Arc::clone(&store)),
            plans: InsurancePlanBook::new(store),
            integrations,
        }
    }
}

pub(crate) fn parse_prior_history(raw: &str) -> Result<PriorPaHistory, String> {
    PriorPaHistory::parse(raw).ok_or_else(|| {
        format!("unknown prior authorization history '{raw}' (expected never, approved, denied, or pending)")
    })
}

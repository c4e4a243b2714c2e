//! Persisted user preferences and saved insurance plans.

mod kv;
mod plans;
mod preferences;
pub mod router;

pub use kv::{
    JsonFileStore, KeyValueStore, MemoryStore, StoreError, ALERTS_MUTED_KEY, INSURANCE_PLANS_KEY,
    THEME_KEY,
};
pub use plans::{InsurancePlan, InsurancePlanBook, InsurancePlanDraft, PlanBookError};
pub use preferences::{PreferenceStore, Preferences, PreferencesPatch, Theme};
pub use router::store_router;

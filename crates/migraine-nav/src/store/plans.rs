use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::kv::{KeyValueStore, StoreError, INSURANCE_PLANS_KEY};

/// A saved insurance card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    pub id: String,
    pub carrier: String,
    pub plan_name: String,
    pub plan_type: String,
    pub member_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_bin: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlanDraft {
    pub carrier: String,
    pub plan_name: String,
    pub plan_type: String,
    pub member_id: String,
    #[serde(default)]
    pub group_number: Option<String>,
    #[serde(default)]
    pub rx_bin: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanBookError {
    #[error("invalid insurance plan: {0}")]
    Invalid(String),
    #[error("insurance plan '{0}' not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Saved plans under the `insurance_plans` key. At most one plan is primary, and exactly one
/// whenever the book is non-empty.
///
/// Clones share one write lock, so concurrent changes through the same book serialize.
#[derive(Clone)]
pub struct InsurancePlanBook {
    store: Arc<dyn KeyValueStore>,
    writes: Arc<Mutex<()>>,
}

impl std::fmt::Debug for InsurancePlanBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsurancePlanBook").finish_non_exhaustive()
    }
}

impl InsurancePlanBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writes: Arc::new(Mutex::new(())),
        }
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, PlanBookError> {
        self.writes.lock().map_err(|_| {
            PlanBookError::Store(StoreError::Unavailable(
                "insurance plan lock poisoned".to_string(),
            ))
        })
    }

    pub fn list(&self) -> Result<Vec<InsurancePlan>, PlanBookError> {
        match self.store.get(INSURANCE_PLANS_KEY)? {
            Some(value) => serde_json::from_value(value).map_err(|source| {
                PlanBookError::Store(StoreError::Shape {
                    key: INSURANCE_PLANS_KEY,
                    source,
                })
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn add(&self, draft: InsurancePlanDraft) -> Result<InsurancePlan, PlanBookError> {
        let draft = validate(draft)?;
        let _guard = self.write_lock()?;
        let mut plans = self.list()?;

        let plan = InsurancePlan {
            id: next_plan_id(&plans),
            carrier: draft.carrier,
            plan_name: draft.plan_name,
            plan_type: draft.plan_type,
            member_id: draft.member_id,
            group_number: draft.group_number,
            rx_bin: draft.rx_bin,
            is_primary: plans.is_empty(),
        };
        plans.push(plan.clone());
        self.save(&plans)?;
        Ok(plan)
    }

    pub fn remove(&self, id: &str) -> Result<(), PlanBookError> {
        let _guard = self.write_lock()?;
        let mut plans = self.list()?;
        let index = plans
            .iter()
            .position(|plan| plan.id == id)
            .ok_or_else(|| PlanBookError::NotFound(id.to_string()))?;
        let removed = plans.remove(index);
        if removed.is_primary {
            if let Some(first) = plans.first_mut() {
                first.is_primary = true;
            }
        }
        self.save(&plans)
    }

    pub fn set_primary(&self, id: &str) -> Result<InsurancePlan, PlanBookError> {
        let _guard = self.write_lock()?;
        let mut plans = self.list()?;
        if !plans.iter().any(|plan| plan.id == id) {
            return Err(PlanBookError::NotFound(id.to_string()));
        }
        for plan in &mut plans {
            plan.is_primary = plan.id == id;
        }
        self.save(&plans)?;
        plans
            .into_iter()
            .find(|plan| plan.id == id)
            .ok_or_else(|| PlanBookError::NotFound(id.to_string()))
    }

    pub fn primary(&self) -> Result<Option<InsurancePlan>, PlanBookError> {
        Ok(self.list()?.into_iter().find(|plan| plan.is_primary))
    }

    fn save(&self, plans: &[InsurancePlan]) -> Result<(), PlanBookError> {
        let value = serde_json::to_value(plans).map_err(|source| StoreError::Shape {
            key: INSURANCE_PLANS_KEY,
            source,
        })?;
        self.store.put(INSURANCE_PLANS_KEY, value)?;
        Ok(())
    }
}

fn validate(mut draft: InsurancePlanDraft) -> Result<InsurancePlanDraft, PlanBookError> {
    for (field, value) in [
        ("carrier", &mut draft.carrier),
        ("planName", &mut draft.plan_name),
        ("planType", &mut draft.plan_type),
        ("memberId", &mut draft.member_id),
    ] {
        *value = value.trim().to_string();
        if value.is_empty() {
            return Err(PlanBookError::Invalid(format!("{field} is required")));
        }
    }
    draft.plan_type = draft.plan_type.to_ascii_lowercase();
    draft.group_number = draft
        .group_number
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    draft.rx_bin = draft
        .rx_bin
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    Ok(draft)
}

/// Ids survive restarts of the file store, so the next id follows the highest stored one.
fn next_plan_id(plans: &[InsurancePlan]) -> String {
    let highest = plans
        .iter()
        .filter_map(|plan| plan.id.strip_prefix("plan-"))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("plan-{:04}", highest + 1)
}

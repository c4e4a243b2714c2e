use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Insurance plan families that carry their own scoring adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Commercial,
    Medicare,
    Medicaid,
    Marketplace,
}

impl PlanType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "commercial" => Some(Self::Commercial),
            "medicare" => Some(Self::Medicare),
            "medicaid" => Some(Self::Medicaid),
            "marketplace" => Some(Self::Marketplace),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            PlanType::Commercial => "commercial",
            PlanType::Medicare => "medicare",
            PlanType::Medicaid => "medicaid",
            PlanType::Marketplace => "marketplace",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PlanType::Commercial => "Commercial",
            PlanType::Medicare => "Medicare",
            PlanType::Medicaid => "Medicaid",
            PlanType::Marketplace => "Marketplace",
        }
    }
}

/// Outcome of any earlier prior-authorization request for the same drug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorPaHistory {
    #[default]
    Never,
    Approved,
    Denied,
    Pending,
}

impl PriorPaHistory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "never" | "none" => Some(Self::Never),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Share of historical denials by cause, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialReasons {
    pub missing_docs: u8,
    pub insufficient_trial: u8,
    pub step_therapy_not_met: u8,
    pub other: u8,
}

/// Denial causes that map to a concrete remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantDenial {
    MissingDocs(u8),
    InsufficientTrial(u8),
    StepTherapyNotMet(u8),
    Other(u8),
}

impl DenialReasons {
    pub fn total(&self) -> u16 {
        u16::from(self.missing_docs)
            + u16::from(self.insufficient_trial)
            + u16::from(self.step_therapy_not_met)
            + u16::from(self.other)
    }

    /// Largest cause; ties resolve in declaration order.
    pub fn dominant(&self) -> DominantDenial {
        let mut dominant = DominantDenial::MissingDocs(self.missing_docs);
        let mut best = self.missing_docs;
        for candidate in [
            DominantDenial::InsufficientTrial(self.insufficient_trial),
            DominantDenial::StepTherapyNotMet(self.step_therapy_not_met),
            DominantDenial::Other(self.other),
        ] {
            let share = match candidate {
                DominantDenial::MissingDocs(share)
                | DominantDenial::InsufficientTrial(share)
                | DominantDenial::StepTherapyNotMet(share)
                | DominantDenial::Other(share) => share,
            };
            if share > best {
                best = share;
                dominant = candidate;
            }
        }
        dominant
    }
}

/// Clinical thresholds a plan usually expects before approving the drug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypicalRequirements {
    pub min_migraine_days: u32,
    pub failed_preventives_count: u32,
    pub trial_duration_weeks: u32,
    pub step_therapy_required: bool,
}

/// Historical aggregate for one drug under one plan family. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDrugStats {
    pub drug: &'static str,
    pub plan_type: &'static str,
    pub avg_approval_rate: f64,
    pub total_requests: u32,
    pub denial_reasons: DenialReasons,
    pub typical_requirements: TypicalRequirements,
}

/// Self-reported clinical profile submitted for one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaRequestProfile {
    pub drug_name: String,
    #[serde(default)]
    pub migraine_days_per_month: Option<u32>,
    pub insurance_plan_type: String,
    #[serde(default)]
    pub step_therapy_complete: bool,
    #[serde(default)]
    pub previous_drugs_tried: BTreeSet<String>,
    #[serde(default)]
    pub prior_pa_history: PriorPaHistory,
    #[serde(default)]
    pub clinical_notes: String,
}

impl PaRequestProfile {
    /// Reported days, treating zero as not reported.
    pub fn reported_migraine_days(&self) -> Option<u32> {
        self.migraine_days_per_month.filter(|days| *days > 0)
    }

    pub fn preventives_tried(&self) -> u32 {
        self.previous_drugs_tried
            .iter()
            .filter(|name| !name.trim().is_empty())
            .count() as u32
    }
}

/// One evaluated rule and its point delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactor {
    pub label: &'static str,
    pub impact: i32,
    pub description: String,
    pub positive: bool,
}

/// Side-by-side comparison of a typical plan requirement and the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCheck {
    pub requirement: &'static str,
    pub required: String,
    pub actual: String,
    pub met: bool,
}

/// Complete estimate returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaResult {
    pub score: f64,
    pub base_rate: f64,
    pub lookup: PlanDrugStats,
    pub factors: Vec<ScoreFactor>,
    pub recommendations: Vec<String>,
    pub requirements_met: Vec<RequirementCheck>,
    /// Plan family whose historical data produced `lookup`.
    pub data_basis: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaLookupError {
    #[error("no prior authorization data for drug '{0}'")]
    UnknownDrug(String),
}

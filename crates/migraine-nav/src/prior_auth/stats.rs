use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::domain::{DenialReasons, PlanDrugStats, TypicalRequirements};

const FALLBACK_PLAN: &str = "commercial";

struct Row {
    drug: &'static str,
    plan: &'static str,
    rate: f64,
    total: u32,
    // missing docs, insufficient trial, step therapy, other
    denials: [u8; 4],
    // min migraine days, failed preventives, trial weeks
    requirements: [u32; 3],
    step_therapy: bool,
}

const fn row(
    drug: &'static str,
    plan: &'static str,
    rate: f64,
    total: u32,
    denials: [u8; 4],
    requirements: [u32; 3],
    step_therapy: bool,
) -> Row {
    Row {
        drug,
        plan,
        rate,
        total,
        denials,
        requirements,
        step_therapy,
    }
}

// Aggregated from published payer PA outcome summaries, 2022-2024.
const ROWS: &[Row] = &[
    row("Sumatriptan", "commercial", 76.6, 18_420, [38, 22, 30, 10], [6, 3, 8], true),
    row("Sumatriptan", "medicare", 81.2, 9_650, [41, 18, 27, 14], [4, 1, 4], false),
    row("Sumatriptan", "medicaid", 72.4, 7_310, [35, 25, 28, 12], [4, 2, 6], true),
    row("Rizatriptan", "commercial", 74.1, 12_880, [40, 20, 29, 11], [4, 1, 4], true),
    row("Rizatriptan", "medicaid", 69.8, 5_120, [37, 26, 27, 10], [4, 2, 6], true),
    row("Aimovig", "commercial", 62.3, 15_230, [31, 34, 25, 10], [4, 2, 8], true),
    row("Aimovig", "medicare", 58.7, 8_840, [29, 36, 24, 11], [8, 3, 12], true),
    row("Aimovig", "medicaid", 51.9, 6_110, [27, 38, 26, 9], [8, 3, 12], true),
    row("Aimovig", "marketplace", 60.4, 3_050, [33, 32, 25, 10], [4, 2, 8], true),
    row("Ajovy", "commercial", 61.5, 9_870, [32, 33, 24, 11], [4, 2, 8], true),
    row("Ajovy", "medicare", 57.2, 5_430, [30, 35, 25, 10], [8, 3, 12], true),
    row("Emgality", "commercial", 63.8, 11_240, [30, 35, 24, 11], [4, 2, 8], true),
    row("Emgality", "medicaid", 53.4, 4_760, [28, 37, 26, 9], [8, 3, 12], true),
    row("Nurtec ODT", "commercial", 58.9, 14_510, [28, 24, 38, 10], [4, 2, 6], true),
    row("Nurtec ODT", "medicare", 55.1, 7_980, [27, 25, 37, 11], [4, 2, 6], true),
    row("Ubrelvy", "commercial", 57.4, 10_320, [29, 23, 39, 9], [4, 2, 6], true),
    row("Ubrelvy", "medicaid", 49.6, 3_870, [26, 27, 38, 9], [4, 2, 8], true),
    row("Qulipta", "commercial", 59.7, 7_640, [30, 36, 24, 10], [4, 2, 8], true),
    row("Botox", "commercial", 66.2, 8_930, [44, 30, 17, 9], [15, 2, 8], true),
    row("Botox", "medicare", 70.5, 6_420, [46, 28, 15, 11], [15, 2, 8], true),
    row("Vyepti", "commercial", 54.8, 2_980, [36, 34, 20, 10], [4, 3, 12], true),
];

fn table() -> &'static BTreeMap<String, PlanDrugStats> {
    static TABLE: OnceLock<BTreeMap<String, PlanDrugStats>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ROWS.iter()
            .map(|row| {
                let [missing_docs, insufficient_trial, step_therapy_not_met, other] = row.denials;
                let [min_migraine_days, failed_preventives_count, trial_duration_weeks] =
                    row.requirements;
                let stats = PlanDrugStats {
                    drug: row.drug,
                    plan_type: row.plan,
                    avg_approval_rate: row.rate,
                    total_requests: row.total,
                    denial_reasons: DenialReasons {
                        missing_docs,
                        insufficient_trial,
                        step_therapy_not_met,
                        other,
                    },
                    typical_requirements: TypicalRequirements {
                        min_migraine_days,
                        failed_preventives_count,
                        trial_duration_weeks,
                        step_therapy_required: row.step_therapy,
                    },
                };
                (lookup_key(row.drug, row.plan), stats)
            })
            .collect()
    })
}

fn lookup_key(drug: &str, plan_type: &str) -> String {
    format!("{}|{}", drug, plan_type.trim().to_ascii_lowercase())
}

/// Exact match on drug name and lower-cased plan type.
pub fn lookup(drug: &str, plan_type: &str) -> Option<&'static PlanDrugStats> {
    table().get(&lookup_key(drug, plan_type))
}

/// Looks up the requested plan, falling back to the commercial record for the drug.
pub fn resolve(drug: &str, plan_type: &str) -> Option<&'static PlanDrugStats> {
    lookup(drug, plan_type).or_else(|| lookup(drug, FALLBACK_PLAN))
}

/// Distinct drug names in the table, alphabetically.
pub fn drugs() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = ROWS.iter().map(|row| row.drug).collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Every record, ordered by key.
pub fn records() -> impl Iterator<Item = &'static PlanDrugStats> {
    table().values()
}

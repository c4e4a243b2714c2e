use super::domain::{
    PaRequestProfile, PlanDrugStats, PlanType, PriorPaHistory, RequirementCheck, ScoreFactor,
};

pub(crate) const SCORE_FLOOR: f64 = 5.0;
pub(crate) const SCORE_CEILING: f64 = 95.0;

const FREQUENCY_HIGH_SURPLUS: u32 = 10;
const FREQUENCY_MID_SURPLUS: u32 = 4;
const FREQUENCY_GAP_POINTS: i32 = 3;
const FREQUENCY_PENALTY_FLOOR: i32 = -20;
const PREVENTIVE_GAP_POINTS: i32 = 6;
const PREVENTIVE_EXTRA_TRIALS: u32 = 2;

/// What the recommendation step needs to know about unmet requirements.
#[derive(Debug, Default)]
pub(crate) struct ScoreSignals {
    pub frequency_gap: Option<u32>,
    pub preventive_gap: Option<u32>,
    pub step_therapy_unmet: bool,
    pub prior_history: PriorPaHistory,
    pub restrictive_plan: Option<PlanType>,
    pub any_negative: bool,
}

pub(crate) fn score_profile(
    profile: &PaRequestProfile,
    stats: &PlanDrugStats,
) -> (Vec<ScoreFactor>, ScoreSignals) {
    let requirements = &stats.typical_requirements;
    let mut factors = Vec::new();
    let mut signals = ScoreSignals {
        prior_history: profile.prior_pa_history,
        ..ScoreSignals::default()
    };

    if let Some(days) = profile.reported_migraine_days() {
        let min = requirements.min_migraine_days;
        if days >= min {
            let surplus = days - min;
            let impact = if surplus >= FREQUENCY_HIGH_SURPLUS {
                8
            } else if surplus >= FREQUENCY_MID_SURPLUS {
                5
            } else {
                3
            };
            factors.push(ScoreFactor {
                label: "Migraine frequency",
                impact,
                description: format!(
                    "{days} migraine days per month meets the {min}-day threshold"
                ),
                positive: true,
            });
        } else {
            let gap = min - days;
            let impact = (-(gap as i32) * FREQUENCY_GAP_POINTS).max(FREQUENCY_PENALTY_FLOOR);
            signals.frequency_gap = Some(gap);
            factors.push(ScoreFactor {
                label: "Migraine frequency",
                impact,
                description: format!(
                    "{days} migraine days per month is {gap} below the typical {min}-day threshold"
                ),
                positive: false,
            });
        }
    }

    let tried = profile.preventives_tried();
    let required = requirements.failed_preventives_count;
    if tried >= required {
        let impact = if tried >= required + PREVENTIVE_EXTRA_TRIALS {
            8
        } else {
            5
        };
        factors.push(ScoreFactor {
            label: "Preventive medication history",
            impact,
            description: format!("{tried} prior preventives tried (plan expects {required})"),
            positive: true,
        });
    } else {
        let gap = required - tried;
        signals.preventive_gap = Some(gap);
        factors.push(ScoreFactor {
            label: "Preventive medication history",
            impact: -(gap as i32) * PREVENTIVE_GAP_POINTS,
            description: format!(
                "{tried} prior preventives tried; plan typically expects {required}"
            ),
            positive: false,
        });
    }

    if profile.step_therapy_complete {
        factors.push(ScoreFactor {
            label: "Step therapy",
            impact: 7,
            description: "step therapy documented as complete".to_string(),
            positive: true,
        });
    } else if requirements.step_therapy_required {
        signals.step_therapy_unmet = true;
        factors.push(ScoreFactor {
            label: "Step therapy",
            impact: -14,
            description: "plan requires step therapy that has not been completed".to_string(),
            positive: false,
        });
    }

    match profile.prior_pa_history {
        PriorPaHistory::Never => {}
        PriorPaHistory::Approved => factors.push(ScoreFactor {
            label: "Prior authorization history",
            impact: 10,
            description: "a previous request for this drug was approved".to_string(),
            positive: true,
        }),
        PriorPaHistory::Denied => factors.push(ScoreFactor {
            label: "Prior authorization history",
            impact: -8,
            description: "a previous request for this drug was denied".to_string(),
            positive: false,
        }),
        PriorPaHistory::Pending => factors.push(ScoreFactor {
            label: "Prior authorization history",
            impact: -3,
            description: "a previous request is still pending".to_string(),
            positive: false,
        }),
    }

    if let Some(plan) = PlanType::parse(&profile.insurance_plan_type) {
        let impact = match plan {
            PlanType::Commercial => 2,
            PlanType::Marketplace => 0,
            PlanType::Medicare => -3,
            PlanType::Medicaid => -5,
        };
        if impact != 0 {
            if impact < 0 {
                signals.restrictive_plan = Some(plan);
            }
            factors.push(ScoreFactor {
                label: "Plan type",
                impact,
                description: format!("{} plan adjustment", plan.label()),
                positive: impact > 0,
            });
        }
    }

    if !profile.clinical_notes.trim().is_empty() {
        factors.push(ScoreFactor {
            label: "Clinical documentation",
            impact: 4,
            description: "clinical notes supplied with the request".to_string(),
            positive: true,
        });
    }

    signals.any_negative = factors.iter().any(|factor| !factor.positive);
    (factors, signals)
}

/// Base rate plus deltas, rounded to one decimal and clamped.
pub(crate) fn total_score(base_rate: f64, factors: &[ScoreFactor]) -> f64 {
    let delta: i32 = factors.iter().map(|factor| factor.impact).sum();
    let raw = base_rate + f64::from(delta);
    let rounded = (raw * 10.0).round() / 10.0;
    rounded.clamp(SCORE_FLOOR, SCORE_CEILING)
}

pub(crate) fn requirement_checks(
    profile: &PaRequestProfile,
    stats: &PlanDrugStats,
) -> Vec<RequirementCheck> {
    let requirements = &stats.typical_requirements;
    let tried = profile.preventives_tried();
    let preventives_met = tried >= requirements.failed_preventives_count;

    let mut checks = vec![
        RequirementCheck {
            requirement: "Monthly migraine days",
            required: format!("{}+ days", requirements.min_migraine_days),
            actual: match profile.reported_migraine_days() {
                Some(days) => format!("{days} days"),
                None => "Not reported".to_string(),
            },
            met: profile
                .reported_migraine_days()
                .is_some_and(|days| days >= requirements.min_migraine_days),
        },
        RequirementCheck {
            requirement: "Failed preventive medications",
            required: format!("{}+", requirements.failed_preventives_count),
            actual: tried.to_string(),
            met: preventives_met,
        },
        RequirementCheck {
            requirement: "Preventive trial duration",
            required: format!("{} weeks each", requirements.trial_duration_weeks),
            actual: "Self-reported".to_string(),
            met: preventives_met,
        },
    ];

    if requirements.step_therapy_required {
        checks.push(RequirementCheck {
            requirement: "Step therapy",
            required: "Completed".to_string(),
            actual: if profile.step_therapy_complete {
                "Completed".to_string()
            } else {
                "Not completed".to_string()
            },
            met: profile.step_therapy_complete,
        });
    }

    checks
}

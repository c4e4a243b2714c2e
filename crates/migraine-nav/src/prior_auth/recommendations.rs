use super::domain::{DominantDenial, PaRequestProfile, PlanDrugStats, PriorPaHistory};
use super::rules::ScoreSignals;

const LOOKS_STRONG: &str = "Your request looks strong: it meets the typical requirements for this plan. Submit it with your headache diary and chart notes attached.";

pub(crate) fn build_recommendations(
    profile: &PaRequestProfile,
    stats: &PlanDrugStats,
    signals: &ScoreSignals,
) -> Vec<String> {
    if !signals.any_negative {
        return vec![LOOKS_STRONG.to_string()];
    }

    let requirements = &stats.typical_requirements;
    let mut recommendations = Vec::new();

    if let Some(gap) = signals.frequency_gap {
        let days = profile.reported_migraine_days().unwrap_or_default();
        recommendations.push(format!(
            "Track migraine days in a headache diary: plans usually expect at least {} migraine days per month for {} and you reported {days} ({gap} short).",
            requirements.min_migraine_days, stats.drug
        ));
        recommendations.push(
            "Ask your prescriber to record your monthly migraine frequency in the chart notes before submitting."
                .to_string(),
        );
    }

    if let Some(gap) = signals.preventive_gap {
        recommendations.push(format!(
            "Document {gap} more preventive trial(s) of at least {} weeks each; this plan typically requires {} failed preventives and you listed {}.",
            requirements.trial_duration_weeks,
            requirements.failed_preventives_count,
            profile.preventives_tried()
        ));
    }

    if signals.step_therapy_unmet {
        recommendations.push(
            "Complete the plan's step therapy with a formulary alternative, or request a step-therapy exception citing documented contraindications."
                .to_string(),
        );
    }

    match signals.prior_history {
        PriorPaHistory::Denied => recommendations.push(
            "Reference the previous denial in a letter of medical necessity and answer each stated denial reason directly."
                .to_string(),
        ),
        PriorPaHistory::Pending => recommendations.push(
            "Wait for the pending request to be decided before filing again; duplicate submissions are commonly rejected."
                .to_string(),
        ),
        PriorPaHistory::Never | PriorPaHistory::Approved => {}
    }

    if let Some(plan) = signals.restrictive_plan {
        recommendations.push(format!(
            "{} reviews for {} tend to be stricter; confirm the formulary tier and any quantity limits before submitting.",
            plan.label(),
            stats.drug
        ));
    }

    match stats.denial_reasons.dominant() {
        DominantDenial::MissingDocs(share) => recommendations.push(format!(
            "{share}% of {} denials cite missing documentation; attach headache diary pages and recent chart notes.",
            stats.drug
        )),
        DominantDenial::InsufficientTrial(share) => recommendations.push(format!(
            "{share}% of {} denials cite an insufficient trial; list start and stop dates and the reason each preventive was stopped.",
            stats.drug
        )),
        DominantDenial::StepTherapyNotMet(share) => recommendations.push(format!(
            "{share}% of {} denials cite unmet step therapy; confirm which alternatives the plan requires first.",
            stats.drug
        )),
        DominantDenial::Other(_) => {}
    }

    recommendations
}

use crate::infra::parse_prior_history;
use clap::Args;
use migraine_nav::error::AppError;
use migraine_nav::prior_auth::{
    PaRequestProfile, PaResult, PlanType, PriorAuthEstimator, PriorPaHistory,
};
use std::fmt::Write;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Drug name as listed by `pa drugs`
    #[arg(long)]
    pub(crate) drug: String,
    /// Plan family: commercial, medicare, medicaid, or marketplace
    #[arg(long, default_value = "commercial")]
    pub(crate) plan_type: String,
    /// Migraine days per month
    #[arg(long)]
    pub(crate) days: Option<u32>,
    /// Preventive medications already tried (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub(crate) tried: Vec<String>,
    /// Step therapy has been completed
    #[arg(long)]
    pub(crate) step_therapy: bool,
    /// Earlier PA outcome for this drug: never, approved, denied, or pending
    #[arg(long, default_value = "never", value_parser = parse_prior_history)]
    pub(crate) prior: PriorPaHistory,
    /// Free-text clinical notes included with the request
    #[arg(long)]
    pub(crate) notes: Option<String>,
    /// Print the full estimate as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl EstimateArgs {
    pub(crate) fn profile(&self) -> PaRequestProfile {
        PaRequestProfile {
            drug_name: self.drug.clone(),
            migraine_days_per_month: self.days,
            insurance_plan_type: self.plan_type.clone(),
            step_therapy_complete: self.step_therapy,
            previous_drugs_tried: self
                .tried
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            prior_pa_history: self.prior,
            clinical_notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let estimator = PriorAuthEstimator::new();
    let result = estimator.estimate(&args.profile())?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{json}");
    } else {
        print!("{}", render_estimate(&result, &args.plan_type));
    }
    Ok(())
}

pub(crate) fn run_drug_list() -> Result<(), AppError> {
    let estimator = PriorAuthEstimator::new();
    println!("Drugs with prior authorization data:");
    for drug in estimator.supported_drugs() {
        println!("  {drug}");
    }
    Ok(())
}

pub(crate) fn render_estimate(result: &PaResult, requested_plan: &str) -> String {
    let requested = PlanType::parse(requested_plan)
        .map(PlanType::label)
        .unwrap_or(requested_plan);

    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Prior authorization estimate: {} ({} plan)",
        result.lookup.drug, requested
    );
    let _ = writeln!(
        out,
        "  Estimated approval odds: {:.1}% (historical base rate {:.1}%, {} data)",
        result.score, result.base_rate, result.data_basis
    );

    let _ = writeln!(out, "\nScore factors:");
    for factor in &result.factors {
        let _ = writeln!(
            out,
            "  {:>+4}  {}: {}",
            factor.impact, factor.label, factor.description
        );
    }

    let _ = writeln!(out, "\nTypical requirements:");
    for check in &result.requirements_met {
        let marker = if check.met { "met" } else { "not met" };
        let _ = writeln!(
            out,
            "  [{marker}] {}: required {}, you have {}",
            check.requirement, check.required, check.actual
        );
    }

    let _ = writeln!(out, "\nRecommendations:");
    for (index, recommendation) in result.recommendations.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, recommendation);
    }
    out
}

use crate::pa::{run_drug_list, run_estimate, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use migraine_nav::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Migraine Navigator",
    about = "Run the Migraine Navigator service or estimate prior-authorization odds from the command line",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Prior-authorization tools
    Pa {
        #[command(subcommand)]
        command: PaCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PaCommand {
    /// Estimate approval odds for a drug and plan type
    Estimate(EstimateArgs),
    /// List drugs covered by the bundled approval table
    Drugs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Pa {
            command: PaCommand::Estimate(args),
        } => run_estimate(args),
        Command::Pa {
            command: PaCommand::Drugs,
        } => run_drug_list(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migraine_nav::prior_auth::PriorPaHistory;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["migraine-nav-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn estimate_flags_parse() {
        let cli = Cli::try_parse_from([
            "migraine-nav-api",
            "pa",
            "estimate",
            "--drug",
            "Aimovig",
            "--plan-type",
            "medicare",
            "--days",
            "12",
            "--tried",
            "topiramate,propranolol",
            "--step-therapy",
            "--prior",
            "denied",
        ])
        .expect("parses");

        let Some(Command::Pa {
            command: PaCommand::Estimate(args),
        }) = cli.command
        else {
            panic!("expected pa estimate");
        };
        assert_eq!(args.drug, "Aimovig");
        assert_eq!(args.tried, vec!["topiramate", "propranolol"]);
        assert!(args.step_therapy);
        assert_eq!(args.prior, PriorPaHistory::Denied);
    }

    #[test]
    fn unknown_prior_history_is_rejected() {
        let result = Cli::try_parse_from([
            "migraine-nav-api",
            "pa",
            "estimate",
            "--drug",
            "Aimovig",
            "--prior",
            "maybe",
        ]);
        assert!(result.is_err());
    }
}

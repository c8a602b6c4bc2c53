use crate::batch::{run_batch, BatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use payout_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "payout-risk-api",
    about = "Score merchants and assign payout hold and reserve policies",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate every merchant in a CSV fixture and print the batch report
    Batch(BatchArgs),
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
        Command::Batch(args) => run_batch(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["payout-risk-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn batch_accepts_fixture_and_worker_override() {
        let cli = Cli::try_parse_from([
            "payout-risk-api",
            "batch",
            "fixtures/merchants.csv",
            "--workers",
            "4",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Batch(args)) => {
                assert_eq!(
                    args.fixtures.as_deref(),
                    Some(std::path::Path::new("fixtures/merchants.csv"))
                );
                assert_eq!(args.workers, Some(4));
                assert!(!args.persist);
            }
            other => panic!("expected batch command, got {other:?}"),
        }
    }
}

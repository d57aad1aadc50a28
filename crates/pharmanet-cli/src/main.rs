//! # pharmanet CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pharmanet_cli::init::{run_init, InitArgs};
use pharmanet_cli::invoke::{run_functions, run_invoke, InvokeArgs};
use pharmanet_cli::log::{run_log, LogArgs};
use pharmanet_cli::{load_network_config, DEFAULT_LEDGER_PATH};

/// PharmaNet supply-chain contracts on a local ledger.
///
/// Invoke Medicine, Order, and PharmacyAssignment contract functions as a
/// chosen organization and inspect what the public log records.
#[derive(Parser, Debug)]
#[command(name = "pharmanet", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the network configuration (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the ledger snapshot.
    #[arg(long, global = true, default_value = DEFAULT_LEDGER_PATH)]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty ledger seeded with the order collection.
    Init(InitArgs),

    /// Invoke a contract function as an organization.
    Invoke(InvokeArgs),

    /// Print the public transaction log.
    Log(LogArgs),

    /// List invocable contract functions.
    Functions,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_network_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Init(args) => run_init(args, &cli.ledger, &config),
        Commands::Invoke(args) => run_invoke(args, &cli.ledger, &config),
        Commands::Log(args) => run_log(args, &cli.ledger),
        Commands::Functions => run_functions(),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_invoke_with_transient() {
        let cli = Cli::try_parse_from([
            "pharmanet",
            "invoke",
            "--org",
            "Org2MSP",
            "--transient",
            "medicineName=Paracetamol",
            "--transient",
            "quantity=300",
            "OrderContract:CreateOrder",
            "ORD-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.org, "Org2MSP");
                assert_eq!(args.transient.len(), 2);
                assert_eq!(args.function, "OrderContract:CreateOrder");
                assert_eq!(args.args, vec!["ORD-1".to_string()]);
            }
            other => panic!("expected invoke, got {other:?}"),
        }
        assert_eq!(cli.ledger, PathBuf::from(DEFAULT_LEDGER_PATH));
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["pharmanet", "-vv", "functions"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Functions));
    }

    #[test]
    fn invoke_requires_org() {
        assert!(Cli::try_parse_from(["pharmanet", "invoke", "MedicineContract:GetAllMedicines"]).is_err());
    }
}

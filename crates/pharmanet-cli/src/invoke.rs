//! # Invoke Subcommand
//!
//! `pharmanet invoke --org Org2MSP --transient quantity=300 ... OrderContract:CreateOrder ORD-1`
//!
//! Runs one contract function as the given organization. Transient fields
//! are handed to the contract out of band and never written to the log.
//! The transaction is committed and the ledger saved only on success.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use pharmanet_contracts::{Chaincode, NetworkConfig, Response};
use pharmanet_core::MspId;

use crate::{open_ledger, save_ledger};

/// Arguments for `pharmanet invoke`.
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// MSP id of the submitting organization.
    #[arg(long)]
    pub org: String,

    /// Confidential input as `field=value`. Repeatable.
    #[arg(long = "transient", value_parser = parse_transient)]
    pub transient: Vec<(String, String)>,

    /// Function to call, as `Contract:Function`.
    pub function: String,

    /// Positional arguments.
    pub args: Vec<String>,
}

/// Parse one `field=value` pair.
pub fn parse_transient(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected field=value, got {raw:?}")),
    }
}

/// Run the invocation and persist the ledger; returns the contract response.
pub fn invoke(args: &InvokeArgs, ledger_path: &Path, config: &NetworkConfig) -> Result<Response> {
    let ledger = open_ledger(ledger_path)?;
    let org = MspId::new(args.org.as_str()).context("invalid --org")?;
    let tx = args
        .transient
        .iter()
        .fold(ledger.begin(org), |tx, (field, value)| {
            tx.with_transient(field.as_str(), value.as_bytes())
        });

    let chaincode = Chaincode::new(config.clone());
    let response = chaincode
        .invoke(&tx, &args.function, &args.args)
        .map_err(|e| anyhow!("{}: {e}", e.code()))?;

    let receipt = tx.commit().context("transaction failed to commit")?;
    match receipt.block_number {
        Some(block) => tracing::info!(tx_id = %receipt.tx_id, block, "committed"),
        None => tracing::debug!(tx_id = %receipt.tx_id, "read-only, nothing committed"),
    }
    save_ledger(&ledger, ledger_path)?;
    Ok(response)
}

/// Execute the invoke subcommand.
pub fn run_invoke(args: &InvokeArgs, ledger_path: &Path, config: &NetworkConfig) -> Result<u8> {
    let response = invoke(args, ledger_path, config)?;
    println!("{}", response.render());
    Ok(0)
}

/// Print every invocable function.
pub fn run_functions() -> Result<u8> {
    for name in Chaincode::functions() {
        println!("{name}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_pairs() {
        assert_eq!(
            parse_transient("quantity=300").unwrap(),
            ("quantity".to_string(), "300".to_string())
        );
        assert_eq!(parse_transient("note=a=b").unwrap().1, "a=b");
        assert!(parse_transient("quantity").is_err());
        assert!(parse_transient("=300").is_err());
    }
}

//! # Init Subcommand
//!
//! `pharmanet init [--force]` writes an empty ledger whose only content is
//! the order collection definition from the network configuration.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use pharmanet_contracts::NetworkConfig;
use pharmanet_ledger::MemoryLedger;

use crate::save_ledger;

/// Arguments for `pharmanet init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing ledger file.
    #[arg(long)]
    pub force: bool,
}

/// Execute the init subcommand.
pub fn run_init(args: &InitArgs, ledger_path: &Path, config: &NetworkConfig) -> Result<u8> {
    if ledger_path.exists() && !args.force {
        bail!(
            "ledger already exists at {} (use --force to overwrite)",
            ledger_path.display()
        );
    }
    let ledger = MemoryLedger::new();
    let collection = config.order_collection_config();
    tracing::info!(collection = %collection.name, "defining order collection");
    ledger.define_collection(collection);
    save_ledger(&ledger, ledger_path)?;
    println!("Initialized empty ledger at {}", ledger_path.display());
    Ok(0)
}

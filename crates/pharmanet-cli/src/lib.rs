//! # pharmanet-cli — PharmaNet Command-Line Interface
//!
//! Drives the supply-chain contracts against a [`MemoryLedger`] persisted
//! as a JSON snapshot between runs. Each `invoke` is one transaction: it is
//! committed only if the contract call succeeds.
//!
//! ## Subcommands
//!
//! - `init` — write an empty ledger seeded with the order collection
//! - `invoke` — run one `Contract:Function` as an organization
//! - `log` — print the public transaction log
//! - `functions` — list invocable functions
//!
//! Argument parsing lives in `main.rs`; each module here exposes an `Args`
//! struct and a `run_*` handler returning the process exit code.

use std::path::Path;

use anyhow::{Context, Result};
use pharmanet_contracts::NetworkConfig;
use pharmanet_ledger::{LedgerSnapshot, MemoryLedger};

pub mod init;
pub mod invoke;
pub mod log;

/// Snapshot file used when `--ledger` is not given.
pub const DEFAULT_LEDGER_PATH: &str = "pharmanet-ledger.json";

/// Network configuration from `--config`, else `$PHARMANET_CONFIG`, else defaults.
pub fn load_network_config(path: Option<&Path>) -> Result<NetworkConfig> {
    match path {
        Some(p) => NetworkConfig::load(p)
            .with_context(|| format!("failed to load network config {}", p.display())),
        None => NetworkConfig::from_env().context("failed to load network config"),
    }
}

/// Open the ledger persisted at `path`.
pub fn open_ledger(path: &Path) -> Result<MemoryLedger> {
    if !path.exists() {
        anyhow::bail!(
            "no ledger at {} (run `pharmanet init` first)",
            path.display()
        );
    }
    let snapshot = LedgerSnapshot::load(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    Ok(MemoryLedger::from_snapshot(snapshot))
}

/// Persist `ledger` to `path`.
pub fn save_ledger(ledger: &MemoryLedger, path: &Path) -> Result<()> {
    ledger
        .snapshot()
        .save(path)
        .with_context(|| format!("failed to write ledger {}", path.display()))
}

//! # Log Subcommand
//!
//! Prints the public transaction log. Private writes appear only as
//! `collection/key` with the committed hash, exactly what a non-member
//! organization can see.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use pharmanet_ledger::BlockEntry;

use crate::open_ledger;

/// Arguments for `pharmanet log`.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Print blocks as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Render one block as text lines.
pub fn format_block(block: &BlockEntry) -> Vec<String> {
    let creator = block
        .creator
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut lines = vec![format!(
        "#{} {} by {} at {}",
        block.block_number, block.tx_id, creator, block.timestamp
    )];
    for write in &block.public_writes {
        let action = if write.value.is_some() { "put" } else { "delete" };
        lines.push(format!("  {action} {}", write.key.escape_debug()));
    }
    for write in &block.private_writes {
        let hash = write
            .hash
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "deleted".to_string());
        lines.push(format!("  private {}/{} {hash}", write.collection, write.key));
    }
    lines
}

/// Execute the log subcommand.
pub fn run_log(args: &LogArgs, ledger_path: &Path) -> Result<u8> {
    let blocks = open_ledger(ledger_path)?.blocks();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(0);
    }
    if blocks.is_empty() {
        println!("No transactions committed.");
    }
    for block in &blocks {
        for line in format_block(block) {
            println!("{line}");
        }
    }
    Ok(0)
}

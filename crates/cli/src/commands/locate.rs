//! Module for the `locate` subcommand, which reports where an anchor call sits in a
//! method listing before any patch is attempted.

use super::load_body;
use async_trait::async_trait;
use clap::Args;
use splicer_core::Opcode;
use splicer_transform::locate::{CallTo, locate_all};
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `locate` subcommand.
#[derive(Args)]
pub struct LocateArgs {
    /// Method listing to scan.
    pub listing: PathBuf,
    /// JSON symbol manifest the listing refers to.
    #[arg(short, long)]
    pub symbols: PathBuf,
    /// Method key of the anchor call, e.g. `VoiceModuleBase::ValidateReceive`.
    #[arg(long)]
    pub anchor: String,
    /// Call opcode of the anchor.
    #[arg(long, default_value = "callvirt")]
    pub opcode: String,
}

/// Executes the `locate` subcommand.
#[async_trait]
impl super::Command for LocateArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let (table, body) = load_body(&self.listing, &self.symbols).await?;
        let op: Opcode = self.opcode.parse()?;
        let method = table.resolve_method(&self.anchor)?;

        let positions = locate_all(&body, &CallTo::new(op, method));
        if positions.is_empty() {
            return Err(format!("no {op} {} in {}", self.anchor, self.listing.display()).into());
        }
        for position in positions {
            println!("{position}");
        }
        Ok(())
    }
}

//! This module parses a method listing against its symbol manifest and prints each
//! instruction with its position, so anchor positions can be read off directly.

use super::load_body;
use async_trait::async_trait;
use clap::Args;
use splicer_core::encoder::encode_instruction;
use std::error::Error;
use std::path::PathBuf;

/// Arguments for the `decode` subcommand.
#[derive(Args)]
pub struct DecodeArgs {
    /// Method listing to parse.
    pub listing: PathBuf,
    /// JSON symbol manifest the listing refers to.
    #[arg(short, long)]
    pub symbols: PathBuf,
}

/// Executes the `decode` subcommand.
#[async_trait]
impl super::Command for DecodeArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let (table, body) = load_body(&self.listing, &self.symbols).await?;
        for (position, instruction) in body.iter().enumerate() {
            let labels: Vec<String> = instruction.labels.iter().map(|l| l.to_string()).collect();
            println!(
                "{position:04}  {:<8} {}",
                labels.join(","),
                encode_instruction(instruction, &table)?
            );
        }
        Ok(())
    }
}

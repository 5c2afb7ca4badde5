//! Module for the `patch` subcommand, which splices the hook call into a method
//! listing.
//!
//! The listing, symbol manifest and method shape are loaded from disk, the hook
//! patch is built from the optional JSON config (defaults otherwise) and run
//! through the default pass. The patched listing goes to stdout or `--output`.

use super::{CliError, load_body, read_text, write_text};
use async_trait::async_trait;
use clap::Args;
use splicer_core::encoder::encode;
use splicer_core::method::MethodShape;
use splicer_transform::Transform;
use splicer_transform::hook_patch::{HookPatch, HookPatchConfig};
use splicer_transform::pass::{DefaultPass, Pass};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Arguments for the `patch` subcommand.
#[derive(Args)]
pub struct PatchArgs {
    /// Method listing to patch.
    pub listing: PathBuf,
    /// JSON symbol manifest the listing refers to.
    #[arg(short, long)]
    pub symbols: PathBuf,
    /// JSON method shape (owner, params, locals) of the patched method.
    #[arg(long)]
    pub shape: PathBuf,
    /// JSON hook patch config; built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Write the patched listing here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Path to emit the pass report as JSON (optional).
    #[arg(long)]
    pub emit: Option<PathBuf>,
}

/// Executes the `patch` subcommand.
#[async_trait]
impl super::Command for PatchArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let PatchArgs {
            listing,
            symbols,
            shape,
            config,
            output,
            emit,
        } = self;

        // Step 1: Load inputs
        let (table, body) = load_body(&listing, &symbols).await?;
        let shape = MethodShape::from_json(&read_text(&shape).await?)?;
        let config = load_config(config.as_deref()).await?;

        // Step 2: Build the patch; fragment problems surface here
        let patch = HookPatch::new(&config, &table, &shape)?;
        let passes: Vec<Box<dyn Transform>> = vec![Box::new(patch)];

        // Step 3: Run
        let (patched, report) = DefaultPass.run(&body, &passes)?;

        // Step 4: Write report if requested
        if let Some(path) = emit.as_ref() {
            write_text(path, &serde_json::to_string_pretty(&report)?).await?;
            eprintln!("Wrote pass report to {}", path.display());
        }

        // Step 5: Output patched listing
        let text = encode(&patched, &table)?;
        match output.as_ref() {
            Some(path) => write_text(path, &text).await?,
            None => print!("{text}"),
        }
        Ok(())
    }
}

async fn load_config(path: Option<&Path>) -> Result<HookPatchConfig, CliError> {
    match path {
        Some(path) => Ok(serde_json::from_str(&read_text(path).await?)?),
        None => Ok(HookPatchConfig::default()),
    }
}

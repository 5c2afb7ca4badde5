use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;
use std::path::Path;

pub mod decode;
pub mod locate;
pub mod patch;

use thiserror::Error;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// File read/write error.
    #[error("file error on '{path}': {source}")]
    File {
        /// Path of the file.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Listing, manifest or shape could not be loaded.
    #[error("load error: {0}")]
    Core(#[from] splicer_core::result::Error),
    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// CLI subcommands for Splicer.
#[derive(Subcommand)]
pub enum Cmd {
    /// Parse a listing and print it with instruction positions.
    Decode(decode::DecodeArgs),
    /// Print every position matching an anchor call.
    Locate(locate::LocateArgs),
    /// Splice the hook call after the anchor and print the patched listing.
    Patch(patch::PatchArgs),
}

/// Trait for executing CLI subcommands.
///
/// Implementors load their inputs from disk, run the engine and print the result.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    ///
    /// # Returns
    /// A `Result` indicating success or an error if execution fails.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Decode(args) => args.execute().await,
            Cmd::Locate(args) => args.execute().await,
            Cmd::Patch(args) => args.execute().await,
        }
    }
}

/// Reads a text input file.
pub(crate) async fn read_text(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::File {
            path: path.display().to_string(),
            source,
        })
}

/// Writes a text output file.
pub(crate) async fn write_text(path: &Path, contents: &str) -> Result<(), CliError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CliError::File {
            path: path.display().to_string(),
            source,
        })
}

/// Loads a listing and the symbol manifest it refers to.
pub(crate) async fn load_body(
    listing: &Path,
    symbols: &Path,
) -> Result<
    (
        splicer_core::symbol::SymbolTable,
        splicer_core::decoder::InstructionSequence,
    ),
    CliError,
> {
    let listing = read_text(listing).await?;
    let manifest = read_text(symbols).await?;
    Ok(splicer_core::load_listing(&listing, &manifest)?)
}

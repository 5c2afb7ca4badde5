use clap::Parser;
use splicer_cli::commands::{Cmd, Command};

/// Splicer CLI
///
/// Splicer rewrites method listings by splicing a hook call after an anchor
/// instruction. It can decode listings, locate anchors and apply the hook patch.
#[derive(Parser)]
#[command(name = "splicer")]
#[command(about = "Splicer: instruction-sequence hook patcher")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the Splicer CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}

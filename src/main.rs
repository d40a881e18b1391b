//! Parlance CLI binary entry point.

use clap::Parser;
use parlance::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect(args) => parlance::cli::handle_inspect(&args),
        Commands::Chat(args) => parlance::cli::handle_chat(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(descriptor) = e.status_descriptor() {
            eprintln!("  {}: {}", descriptor.name, descriptor.typical_cause);
        }
        std::process::exit(1);
    }
}

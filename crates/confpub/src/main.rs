//! confpub CLI - Publish MkDocs documentation to Confluence.
//!
//! Provides commands for:
//! - `publish`: Mirror the site navigation into Confluence and push page content
//! - `versions deploy|list|delete`: Manage versioned builds with mike
//! - `convert`: Convert Word documents into markdown pages

mod commands;
mod error;
mod output;
mod tool;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, PublishArgs, VersionsCommand};
use output::Output;

/// confpub - Publish MkDocs documentation to Confluence.
#[derive(Parser)]
#[command(name = "confpub", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the site to Confluence.
    Publish(PublishArgs),
    /// Versioned documentation commands.
    #[command(subcommand)]
    Versions(VersionsCommand),
    /// Convert Word documents to markdown.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::Versions(cmd) => cmd.execute(),
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

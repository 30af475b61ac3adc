//! # sfy CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Settisfy booking stack CLI.
///
/// Simulates booking lifecycles against the in-memory store and inspects
/// the legal-transition table.
#[derive(Parser, Debug)]
#[command(name = "sfy", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a scripted booking lifecycle and print the timeline.
    Simulate(sfy_cli::simulate::SimulateArgs),
    /// Print the legal-transition table.
    Transitions(sfy_cli::transitions::TransitionsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => sfy_cli::simulate::run(&args),
        Commands::Transitions(args) => sfy_cli::transitions::run(&args),
    }
}

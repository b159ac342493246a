//! Wargame CLI - Command-line interface
//!
//! Commands:
//! - run: Simulate a tournament from a faction configuration
//! - strategies: List the built-in strategies

mod run_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wargame_core::{BuiltinStrategy, StrategyRegistry};

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Evolutionary iterated social-dilemma tournament simulator")]
struct Cli {
    /// Random seed (default: seeded from entropy)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log epoch and population details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tournament
    Run(run_cmd::RunArgs),
    /// List the built-in strategies
    Strategies,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run_cmd::run(args, cli.seed),
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

/// Log to stderr so JSON on stdout stays clean; RUST_LOG overrides
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_strategies() {
    let registry = StrategyRegistry::builtin();
    println!("Built-in strategies ({}):", registry.len());
    for name in registry.names() {
        let description = BuiltinStrategy::from_name(name)
            .map(BuiltinStrategy::description)
            .unwrap_or_default();
        println!("  {:<24} {}", name, description);
    }
}

//! Run command - simulate a tournament from a faction configuration
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_run_config(), simulate(), report_results()
//! - Level 3: build_payoff(), save_results()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use wargame_core::{FactionConfig, PayoffRule, StrategyRegistry};
use wargame_tournament::{
    FeedbackConfig, Normalization, PairingScheme, ResultsTable, RunConfig, Wargame,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct RunArgs {
    /// Faction configuration JSON file
    #[arg(long, value_name = "FILE", default_value = "configs/config.json")]
    pub config: PathBuf,

    /// Number of epochs
    #[arg(long, default_value = "10")]
    pub epochs: usize,

    /// Rounds per epoch
    #[arg(long, default_value = "100")]
    pub rounds: usize,

    /// World population the faction shares are scaled by
    #[arg(long, default_value = "5000")]
    pub population: u64,

    /// Rebalance faction populations after each epoch
    #[arg(long)]
    pub feedback: bool,

    /// Agents gained per unit of normalized score (with --feedback)
    #[arg(long, default_value_t = FeedbackConfig::DEFAULT_SCALE_FACTOR)]
    pub scale_factor: f64,

    /// Normalization denominator
    #[arg(long, value_enum, default_value_t = NormalizationArg::Total)]
    pub normalization: NormalizationArg,

    /// Pairing scheme
    #[arg(long, value_enum, default_value_t = PairingArg::Matching)]
    pub pairing: PairingArg,

    /// Payoff table preset
    #[arg(long, value_enum, default_value_t = PayoffPreset::Classic)]
    pub payoff: PayoffPreset,

    /// Override: payoff for mutual cooperation
    #[arg(long, allow_negative_numbers = true)]
    pub reward: Option<i64>,

    /// Override: payoff for mutual defection
    #[arg(long, allow_negative_numbers = true)]
    pub punishment: Option<i64>,

    /// Override: payoff for cooperating against a defector
    #[arg(long, allow_negative_numbers = true)]
    pub sucker: Option<i64>,

    /// Override: payoff for defecting against a cooperator
    #[arg(long, allow_negative_numbers = true)]
    pub temptation: Option<i64>,

    /// Resolve skirmishes in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Save results as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NormalizationArg {
    /// Divide by total world population
    Total,
    /// Divide by each faction's own population
    Faction,
}

impl From<NormalizationArg> for Normalization {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::Total => Normalization::TotalPopulation,
            NormalizationArg::Faction => Normalization::FactionPopulation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PairingArg {
    /// Random perfect matching, one encounter per agent
    Matching,
    /// Agents zipped against a random derangement, two encounters per agent
    Permutation,
}

impl From<PairingArg> for PairingScheme {
    fn from(arg: PairingArg) -> Self {
        match arg {
            PairingArg::Matching => PairingScheme::Matching,
            PairingArg::Permutation => PairingScheme::Permutation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PayoffPreset {
    /// +1/+1, -2/-2, -1/+2
    Classic,
    /// +1/+1, -1/-1, 0/+2
    Mild,
}

/// Saved results document
#[derive(Serialize)]
struct ResultsDocument<'a> {
    generated_at: String,
    config: &'a RunConfig,
    results: &'a ResultsTable,
    cumulative: Vec<f64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// This function reads like a table of contents:
/// 1. Build run configuration
/// 2. Load factions and simulate every epoch
/// 3. Report and save results
pub fn run(args: RunArgs, seed: Option<u64>) -> Result<()> {
    let config = build_run_config(&args, seed);
    let factions = FactionConfig::load(&args.config)
        .with_context(|| format!("Failed to load faction config: {}", args.config.display()))?;

    tracing::info!(
        "Starting wargame: {} factions, epochs={}, rounds={}, population={}",
        factions.len(),
        config.epochs,
        config.rounds_per_epoch,
        config.world_population
    );
    tracing::debug!(
        "Payoff rule {:?} (prisoner's dilemma ordering: {})",
        config.payoff,
        config.payoff.is_dilemma()
    );

    let results = simulate(&factions, config.clone(), args.json)?;

    report_results(&results, &config, &args)?;

    if let Some(path) = &args.output {
        save_results(&results, &config, path)?;
        tracing::info!("Results saved to {}", path.display());
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build run configuration from command arguments
fn build_run_config(args: &RunArgs, seed: Option<u64>) -> RunConfig {
    RunConfig {
        epochs: args.epochs,
        rounds_per_epoch: args.rounds,
        world_population: args.population,
        feedback: args.feedback.then(|| FeedbackConfig::new(args.scale_factor)),
        normalization: args.normalization.into(),
        pairing: args.pairing.into(),
        payoff: build_payoff(args),
        parallel: args.parallel,
        seed,
    }
}

/// Run every epoch with a progress bar
fn simulate(factions: &FactionConfig, config: RunConfig, quiet: bool) -> Result<ResultsTable> {
    let registry = StrategyRegistry::builtin();
    let mut game = Wargame::new(factions, &registry, config).context("Failed to set up wargame")?;
    let epochs = game.config().epochs as u64;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(epochs)
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} epochs {msg}")
            .context("Invalid progress template")?,
    );

    game.run_with_callback(|row, population| {
        progress.set_message(format!("population {}", population.total()));
        progress.inc(1);
        tracing::debug!(
            "Population after epoch {}: {:?}",
            row.epoch,
            population.agent_counts()
        );
    })
    .context("Wargame run failed")?;

    progress.finish_and_clear();
    tracing::debug!(
        "Finished {} epochs for factions {:?}",
        game.epochs_completed(),
        game.faction_names()
    );
    Ok(game.into_results())
}

/// Report results
fn report_results(results: &ResultsTable, config: &RunConfig, args: &RunArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(&results_document(results, config))?;
        println!("{}", json);
    } else {
        print!("{}", format_results_table(results));
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Start from the preset and apply per-outcome overrides
fn build_payoff(args: &RunArgs) -> PayoffRule {
    let base = match args.payoff {
        PayoffPreset::Classic => PayoffRule::classic(),
        PayoffPreset::Mild => PayoffRule::mild(),
    };

    PayoffRule::new(
        args.reward.unwrap_or(base.reward),
        args.punishment.unwrap_or(base.punishment),
        args.sucker.unwrap_or(base.sucker),
        args.temptation.unwrap_or(base.temptation),
    )
}

/// Save results document as JSON
fn save_results(results: &ResultsTable, config: &RunConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&results_document(results, config))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn results_document<'a>(results: &'a ResultsTable, config: &'a RunConfig) -> ResultsDocument<'a> {
    ResultsDocument {
        generated_at: chrono::Utc::now().to_rfc3339(),
        config,
        results,
        cumulative: results.cumulative(),
    }
}

/// Aligned text table: one row per epoch, one column per faction
fn format_results_table(results: &ResultsTable) -> String {
    let widths: Vec<usize> = results
        .factions()
        .iter()
        .map(|name| name.len().max(10))
        .collect();

    let mut out = String::from("\n=== Wargame Results ===\n");

    out.push_str(&format!("{:>6}", "epoch"));
    for (name, width) in results.factions().iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name, width = width));
    }
    out.push('\n');

    for row in results.rows() {
        out.push_str(&format!("{:>6}", row.epoch));
        for (score, width) in row.scores.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$.4}", score, width = width));
        }
        out.push('\n');
    }

    out.push_str(&format!("{:>6}", "total"));
    for (score, width) in results.cumulative().iter().zip(&widths) {
        out.push_str(&format!("  {:>width$.4}", score, width = width));
    }
    out.push('\n');

    out
}

// ============================================================================
// TESTS
// ============================================================================

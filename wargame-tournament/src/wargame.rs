//! Wargame - runs a full multi-epoch simulation
//!
//! Level 1 - Orchestration

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wargame_core::{FactionConfig, Result, StrategyRegistry};

use crate::config::RunConfig;
use crate::epoch::run_epoch;
use crate::feedback::apply_feedback;
use crate::population::Population;
use crate::results::{EpochRow, ResultsTable};
use crate::skirmish::SeatedFaction;

/// A configured simulation and its results so far
pub struct Wargame {
    config: RunConfig,
    factions: Vec<SeatedFaction>,
    population: Population,
    results: ResultsTable,
    rng: ChaCha8Rng,
}

impl Wargame {
    /// Seat every faction and size the initial population
    ///
    /// Fails on invalid run parameters, on a faction whose strategy is not
    /// registered, and on a negative or non-finite share.
    pub fn new(factions: &FactionConfig, registry: &StrategyRegistry, config: RunConfig) -> Result<Self> {
        config.validate()?;

        let seated = factions
            .factions()
            .iter()
            .map(|f| {
                let strategy = registry.resolve(&f.name, &f.strategy)?;
                Ok(SeatedFaction::new(f.name.clone(), strategy))
            })
            .collect::<Result<Vec<_>>>()?;

        let population = Population::from_shares(factions.factions(), config.world_population)?;
        let rng = create_rng(config.seed);

        tracing::debug!(
            factions = seated.len(),
            agents = population.total(),
            "wargame constructed"
        );

        Ok(Self {
            config,
            factions: seated,
            results: ResultsTable::new(factions.names()),
            population,
            rng,
        })
    }

    /// Load the faction document and construct
    pub fn from_config_file(path: &Path, registry: &StrategyRegistry, config: RunConfig) -> Result<Self> {
        let factions = FactionConfig::load(path)?;
        Self::new(&factions, registry, config)
    }

    /// Run every remaining epoch
    pub fn run(&mut self) -> Result<&ResultsTable> {
        self.run_with_callback(|_, _| {})
    }

    /// Run every remaining epoch, reporting each finished row and the
    /// population the next epoch will use
    pub fn run_with_callback<F>(&mut self, mut on_epoch: F) -> Result<&ResultsTable>
    where
        F: FnMut(&EpochRow, &Population),
    {
        tracing::info!(
            epochs = self.config.epochs,
            rounds_per_epoch = self.config.rounds_per_epoch,
            world_population = self.config.world_population,
            feedback = self.config.feedback_enabled(),
            "starting wargame"
        );

        while self.results.len() < self.config.epochs {
            let epoch = self.advance()?;
            on_epoch(&self.results.rows()[epoch], &self.population);
        }

        Ok(&self.results)
    }

    /// Run a single epoch, appending its row
    pub fn run_epoch(&mut self) -> Result<&EpochRow> {
        let epoch = self.advance()?;
        Ok(&self.results.rows()[epoch])
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn into_results(self) -> ResultsTable {
        self.results
    }

    /// Population the next epoch will be expanded from
    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn faction_names(&self) -> &[String] {
        self.results.factions()
    }

    pub fn epochs_completed(&self) -> usize {
        self.results.len()
    }

    // ========================================================================
    // Level 2 - Phases
    // ========================================================================

    /// Play one epoch, record it, then rebalance if feedback is on
    fn advance(&mut self) -> Result<usize> {
        let outcome = run_epoch(&self.factions, &self.population, &self.config, &mut self.rng)?;
        let row = self.results.push(outcome);
        let epoch = row.epoch;

        tracing::info!(epoch, scores = ?row.scores, "epoch complete");

        if let Some(feedback) = &self.config.feedback {
            let scores = row.scores.clone();
            apply_feedback(&mut self.population, &scores, feedback);
            tracing::debug!(
                epoch,
                population = ?self.population.agent_counts(),
                "population after feedback"
            );
        }

        Ok(epoch)
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

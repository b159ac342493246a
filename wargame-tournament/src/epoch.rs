//! Epoch aggregator - runs the rounds of one epoch and scores factions
//!
//! Level 2 - Phase-level implementation

use rand::Rng;
use rayon::prelude::*;
use wargame_core::{Action, PayoffRule, Result, WargameError};

use crate::config::{Normalization, PairingScheme, RunConfig};
use crate::pairing::{pair_agents, Pairing};
use crate::population::{expand_population, AgentId, Population};
use crate::skirmish::{resolve_skirmish, SeatedFaction, SkirmishOutcome};

/// Result of one completed epoch
#[derive(Clone, Debug, PartialEq)]
pub struct EpochOutcome {
    /// Whole agents per faction during the epoch
    pub populations: Vec<u64>,
    /// Summed score deltas per faction
    pub raw_scores: Vec<i64>,
    /// Normalized scores per faction
    pub scores: Vec<f64>,
}

/// Run every round of an epoch (Level 2 phase)
///
/// Memory and running totals live only for the duration of this call.
/// Rounds are strictly sequential; skirmishes inside a round only read the
/// previous round's memory, so they may run in parallel.
pub fn run_epoch<R: Rng + ?Sized>(
    factions: &[SeatedFaction],
    population: &Population,
    config: &RunConfig,
    rng: &mut R,
) -> Result<EpochOutcome> {
    if factions.len() != population.len() {
        return Err(WargameError::InvalidParameter(format!(
            "{} factions seated for {} population entries",
            factions.len(),
            population.len()
        )));
    }

    let agents = expand_population(population);
    let mut memory: Vec<Option<Action>> = vec![None; agents.len()];
    let mut running = vec![0i64; factions.len()];

    for round in 0..config.rounds_per_epoch {
        let pairings = pair_agents(agents.len(), config.pairing, rng);
        let outcomes = resolve_round(factions, &agents, &memory, &pairings, config)?;
        apply_round(&agents, &pairings, &outcomes, config.pairing, &mut memory, &mut running);

        tracing::trace!(
            round,
            pairings = pairings.len(),
            joint_delta = round_joint_delta(&outcomes, &config.payoff),
            "round resolved"
        );
    }

    let populations = population.agent_counts();
    let scores = normalize_scores(&running, &populations, config.normalization);

    Ok(EpochOutcome {
        populations,
        raw_scores: running,
        scores,
    })
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Decide every skirmish of a round against last round's memory
fn resolve_round(
    factions: &[SeatedFaction],
    agents: &[AgentId],
    memory: &[Option<Action>],
    pairings: &[Pairing],
    config: &RunConfig,
) -> Result<Vec<Option<SkirmishOutcome>>> {
    let resolve = |pairing: &Pairing| -> Result<Option<SkirmishOutcome>> {
        if pairing.is_bye() {
            return Ok(None);
        }
        let player = &factions[agents[pairing.player].faction()];
        let opponent = &factions[agents[pairing.opponent].faction()];
        resolve_skirmish(
            player,
            opponent,
            memory[pairing.player],
            memory[pairing.opponent],
            &config.payoff,
        )
        .map(Some)
    };

    if config.parallel {
        pairings.par_iter().map(resolve).collect()
    } else {
        pairings.iter().map(resolve).collect()
    }
}

/// Write this round's actions into memory and scores into the totals
fn apply_round(
    agents: &[AgentId],
    pairings: &[Pairing],
    outcomes: &[Option<SkirmishOutcome>],
    scheme: PairingScheme,
    memory: &mut [Option<Action>],
    running: &mut [i64],
) {
    for (pairing, outcome) in pairings.iter().zip(outcomes) {
        let Some(outcome) = outcome else {
            continue;
        };

        running[agents[pairing.player].faction()] += outcome.player_delta;
        running[agents[pairing.opponent].faction()] += outcome.opponent_delta;

        memory[pairing.player] = Some(outcome.player_action);
        // Under Permutation each seat also appears once as opponent; its
        // memory comes from its own player slot
        if scheme == PairingScheme::Matching {
            memory[pairing.opponent] = Some(outcome.opponent_action);
        }
    }
}

// ============================================================================
// Level 4 - Utilities
// ============================================================================

/// Combined score delta of every skirmish played in a round
fn round_joint_delta(outcomes: &[Option<SkirmishOutcome>], payoff: &PayoffRule) -> i64 {
    outcomes
        .iter()
        .flatten()
        .map(|o| payoff.joint_score(o.player_action, o.opponent_action))
        .sum()
}

/// Divide running totals by the chosen denominator; empty denominators give 0
fn normalize_scores(running: &[i64], populations: &[u64], normalization: Normalization) -> Vec<f64> {
    let total: u64 = populations.iter().sum();

    running
        .iter()
        .zip(populations)
        .map(|(&score, &own)| {
            let denominator = match normalization {
                Normalization::TotalPopulation => total,
                Normalization::FactionPopulation => own,
            };
            if denominator == 0 {
                0.0
            } else {
                score as f64 / denominator as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;
    use wargame_core::{BuiltinStrategy, Strategy, StrategyError};

    struct Failing;

    impl Strategy for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn decide(&self, _last: Option<Action>) -> std::result::Result<Action, StrategyError> {
            Err(StrategyError::Undecidable("no move".to_string()))
        }
    }

    fn seat(strategies: &[BuiltinStrategy]) -> Vec<SeatedFaction> {
        strategies
            .iter()
            .map(|&s| SeatedFaction::new(s.as_str(), Arc::new(s)))
            .collect()
    }

    fn population(counts: &[f64]) -> Population {
        let names = (0..counts.len()).map(|i| format!("f{}", i)).collect();
        Population::from_counts(names, counts.to_vec()).unwrap()
    }

    #[test]
    fn test_cooperator_vs_defector_single_round() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate, BuiltinStrategy::AlwaysDefect]);
        let config = RunConfig::new(1, 1, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let outcome = run_epoch(&factions, &population(&[1.0, 1.0]), &config, &mut rng).unwrap();

        assert_eq!(outcome.raw_scores, vec![-1, 2]);
        assert_eq!(outcome.populations, vec![1, 1]);
        assert_eq!(outcome.scores, vec![-0.5, 1.0]);
    }

    #[test]
    fn test_memory_carries_to_next_round() {
        let factions = seat(&[BuiltinStrategy::TitForTat, BuiltinStrategy::AlwaysDefect]);
        let config = RunConfig::new(1, 2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let outcome = run_epoch(&factions, &population(&[1.0, 1.0]), &config, &mut rng).unwrap();

        // Round 1: C vs D -> -1 / +2. Round 2: TFT retaliates, D vs D -> -2 / -2
        assert_eq!(outcome.raw_scores, vec![-3, 0]);
    }

    #[test]
    fn test_normalization_by_total_population() {
        let factions = seat(&[BuiltinStrategy::AlwaysDefect, BuiltinStrategy::TitForTat]);
        let config = RunConfig::new(1, 5, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let outcome = run_epoch(&factions, &population(&[50.0, 50.0]), &config, &mut rng).unwrap();

        for i in 0..2 {
            assert_eq!(outcome.scores[i], outcome.raw_scores[i] as f64 / 100.0);
        }
    }

    #[test]
    fn test_normalization_by_faction_population() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate, BuiltinStrategy::AlwaysCooperate]);
        let config = RunConfig::new(1, 3, 100).with_normalization(Normalization::FactionPopulation);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let outcome = run_epoch(&factions, &population(&[20.0, 80.0]), &config, &mut rng).unwrap();

        // Every agent earns +1 per round
        assert_eq!(outcome.raw_scores, vec![60, 240]);
        assert_eq!(outcome.scores, vec![3.0, 3.0]);
    }

    #[test]
    fn test_odd_population_bye_scores_nothing() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate]);
        let config = RunConfig::new(1, 1, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = run_epoch(&factions, &population(&[3.0]), &config, &mut rng).unwrap();
        assert_eq!(outcome.raw_scores, vec![2]);
    }

    #[test]
    fn test_permutation_plays_each_agent_twice() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate, BuiltinStrategy::AlwaysDefect]);
        let config = RunConfig::new(1, 1, 2).with_pairing(PairingScheme::Permutation);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outcome = run_epoch(&factions, &population(&[1.0, 1.0]), &config, &mut rng).unwrap();
        assert_eq!(outcome.raw_scores, vec![-2, 4]);
    }

    #[test]
    fn test_zero_population_epoch_is_all_zero() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate, BuiltinStrategy::AlwaysDefect]);
        let config = RunConfig::new(1, 10, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outcome = run_epoch(&factions, &population(&[0.0, 0.0]), &config, &mut rng).unwrap();
        assert_eq!(outcome.raw_scores, vec![0, 0]);
        assert_eq!(outcome.scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let factions = seat(&[
            BuiltinStrategy::TitForTat,
            BuiltinStrategy::AlwaysDefect,
            BuiltinStrategy::ReverseTitForTat,
        ]);
        let pop = population(&[40.0, 35.0, 25.0]);

        let sequential = RunConfig::new(1, 20, 100);
        let parallel = RunConfig::new(1, 20, 100).with_parallel(true);

        let a = run_epoch(&factions, &pop, &sequential, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let b = run_epoch(&factions, &pop, &parallel, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_strategy_failure_aborts_epoch() {
        let mut factions = seat(&[BuiltinStrategy::AlwaysCooperate]);
        factions.push(SeatedFaction::new("broken", Arc::new(Failing)));
        let config = RunConfig::new(1, 1, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let result = run_epoch(&factions, &population(&[1.0, 1.0]), &config, &mut rng);
        assert!(matches!(result, Err(WargameError::StrategyFailure { .. })));
    }

    #[test]
    fn test_faction_count_mismatch() {
        let factions = seat(&[BuiltinStrategy::AlwaysCooperate]);
        let config = RunConfig::new(1, 1, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let result = run_epoch(&factions, &population(&[1.0, 1.0]), &config, &mut rng);
        assert!(matches!(result, Err(WargameError::InvalidParameter(_))));
    }

    fn outcome(player: Action, opponent: Action) -> SkirmishOutcome {
        let (player_delta, opponent_delta) = PayoffRule::classic().score(player, opponent);
        SkirmishOutcome {
            player_action: player,
            opponent_action: opponent,
            player_delta,
            opponent_delta,
        }
    }

    #[test]
    fn test_bye_keeps_previous_memory() {
        let agents = [AgentId::new(0), AgentId::new(1), AgentId::new(0)];
        let pairings = [Pairing::new(0, 1), Pairing::new(2, 2)];
        let outcomes = [Some(outcome(Action::Cooperate, Action::Defect)), None];
        let mut memory = vec![None, None, Some(Action::Defect)];
        let mut running = vec![0i64; 2];

        apply_round(&agents, &pairings, &outcomes, PairingScheme::Matching, &mut memory, &mut running);

        assert_eq!(
            memory,
            vec![Some(Action::Cooperate), Some(Action::Defect), Some(Action::Defect)]
        );
        assert_eq!(running, vec![-1, 2]);
    }

    #[test]
    fn test_permutation_memory_comes_from_player_slot() {
        let agents = [AgentId::new(0), AgentId::new(1)];
        // Seat 0 cooperates as player but defects when it is the opponent
        let pairings = [Pairing::new(0, 1), Pairing::new(1, 0)];
        let outcomes = [
            Some(outcome(Action::Cooperate, Action::Cooperate)),
            Some(outcome(Action::Defect, Action::Defect)),
        ];
        let mut memory = vec![None, None];
        let mut running = vec![0i64; 2];

        apply_round(&agents, &pairings, &outcomes, PairingScheme::Permutation, &mut memory, &mut running);

        assert_eq!(memory, vec![Some(Action::Cooperate), Some(Action::Defect)]);
        // Opponent-side actions still score: (+1 -2) for each seat
        assert_eq!(running, vec![-1, -1]);
    }

    #[test]
    fn test_matching_writes_both_seats() {
        let agents = [AgentId::new(0), AgentId::new(1)];
        let pairings = [Pairing::new(1, 0)];
        let outcomes = [Some(outcome(Action::Defect, Action::Cooperate))];
        let mut memory = vec![Some(Action::Defect), Some(Action::Cooperate)];
        let mut running = vec![0i64; 2];

        apply_round(&agents, &pairings, &outcomes, PairingScheme::Matching, &mut memory, &mut running);

        assert_eq!(memory, vec![Some(Action::Cooperate), Some(Action::Defect)]);
        assert_eq!(running, vec![-1, 2]);
    }

    #[test]
    fn test_round_joint_delta_skips_byes() {
        let outcomes = [
            Some(outcome(Action::Cooperate, Action::Defect)),
            None,
            Some(outcome(Action::Defect, Action::Defect)),
        ];
        assert_eq!(round_joint_delta(&outcomes, &PayoffRule::classic()), 1 - 4);
    }

    #[test]
    fn test_normalize_scores_zero_denominators() {
        let scores = normalize_scores(&[5, -3], &[0, 0], Normalization::TotalPopulation);
        assert_eq!(scores, vec![0.0, 0.0]);

        let scores = normalize_scores(&[5, -3], &[10, 0], Normalization::FactionPopulation);
        assert_eq!(scores, vec![0.5, 0.0]);
    }
}

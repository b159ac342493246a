//! Skirmish resolver - one encounter between two agents
//!
//! Level 3 - Step-level implementation

use std::sync::Arc;

use wargame_core::{Action, PayoffRule, Result, Strategy, WargameError};

/// A faction with its strategy resolved from the registry
#[derive(Clone)]
pub struct SeatedFaction {
    pub name: String,
    pub strategy: Arc<dyn Strategy>,
}

impl SeatedFaction {
    pub fn new(name: impl Into<String>, strategy: Arc<dyn Strategy>) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }

    /// Ask the strategy for a move, tagging failures with the faction
    fn decide(&self, last_opponent_action: Option<Action>) -> Result<Action> {
        self.strategy
            .decide(last_opponent_action)
            .map_err(|source| WargameError::StrategyFailure {
                faction: self.name.clone(),
                source,
            })
    }
}

impl std::fmt::Debug for SeatedFaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatedFaction")
            .field("name", &self.name)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}

/// Actions and score deltas of one encounter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkirmishOutcome {
    pub player_action: Action,
    pub opponent_action: Action,
    pub player_delta: i64,
    pub opponent_delta: i64,
}

/// Resolve one encounter
///
/// Each side sees only the other side's previous action. Both decisions
/// are taken before anything is written back, so neither side can observe
/// the other's current move.
pub fn resolve_skirmish(
    player: &SeatedFaction,
    opponent: &SeatedFaction,
    player_last: Option<Action>,
    opponent_last: Option<Action>,
    payoff: &PayoffRule,
) -> Result<SkirmishOutcome> {
    let player_action = player.decide(opponent_last)?;
    let opponent_action = opponent.decide(player_last)?;
    let (player_delta, opponent_delta) = payoff.score(player_action, opponent_action);

    Ok(SkirmishOutcome {
        player_action,
        opponent_action,
        player_delta,
        opponent_delta,
    })
}

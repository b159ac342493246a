//! Strategies and the registry that maps names to them
//!
//! A strategy sees only the opponent's previous action (or `None` on its
//! first encounter of the epoch) and returns this round's action. The
//! registry is an explicit table assembled at startup and handed to the
//! engine; nothing registers itself.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::action::Action;
use crate::error::{Result, StrategyError, WargameError};

/// Decision function for one faction
///
/// Implementations must not touch state belonging to other factions; the
/// engine may call `decide` from several threads within one round.
pub trait Strategy: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Choose this round's action given the opponent's previous action
    fn decide(&self, last_opponent_action: Option<Action>) -> std::result::Result<Action, StrategyError>;
}

/// Strategies shipped with the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinStrategy {
    AlwaysCooperate,
    AlwaysDefect,
    /// Cooperate first, then copy the opponent
    TitForTat,
    /// Defect first, then copy the opponent
    SuspiciousTitForTat,
    /// Defect first, then do the opposite of the opponent
    ReverseTitForTat,
}

impl BuiltinStrategy {
    pub const ALL: [BuiltinStrategy; 5] = [
        BuiltinStrategy::AlwaysCooperate,
        BuiltinStrategy::AlwaysDefect,
        BuiltinStrategy::TitForTat,
        BuiltinStrategy::SuspiciousTitForTat,
        BuiltinStrategy::ReverseTitForTat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinStrategy::AlwaysCooperate => "always_cooperate",
            BuiltinStrategy::AlwaysDefect => "always_defect",
            BuiltinStrategy::TitForTat => "tit_for_tat",
            BuiltinStrategy::SuspiciousTitForTat => "suspicious_tit_for_tat",
            BuiltinStrategy::ReverseTitForTat => "reverse_tit_for_tat",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// One-line description for listings
    pub fn description(self) -> &'static str {
        match self {
            BuiltinStrategy::AlwaysCooperate => "cooperates unconditionally",
            BuiltinStrategy::AlwaysDefect => "defects unconditionally",
            BuiltinStrategy::TitForTat => "opens with cooperation, then mirrors the opponent",
            BuiltinStrategy::SuspiciousTitForTat => "opens with defection, then mirrors the opponent",
            BuiltinStrategy::ReverseTitForTat => "opens with defection, then does the opposite of the opponent",
        }
    }

    fn choose(self, last_opponent_action: Option<Action>) -> Action {
        match (self, last_opponent_action) {
            (BuiltinStrategy::AlwaysCooperate, _) => Action::Cooperate,
            (BuiltinStrategy::AlwaysDefect, _) => Action::Defect,
            (BuiltinStrategy::TitForTat, None) => Action::Cooperate,
            (BuiltinStrategy::SuspiciousTitForTat, None) => Action::Defect,
            (BuiltinStrategy::TitForTat | BuiltinStrategy::SuspiciousTitForTat, Some(last)) => last,
            (BuiltinStrategy::ReverseTitForTat, None) => Action::Defect,
            (BuiltinStrategy::ReverseTitForTat, Some(last)) => last.opposite(),
        }
    }
}

impl Strategy for BuiltinStrategy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn decide(&self, last_opponent_action: Option<Action>) -> std::result::Result<Action, StrategyError> {
        Ok(self.choose(last_opponent_action))
    }
}

/// Explicit name -> strategy table
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: FxHashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for strategy in BuiltinStrategy::ALL {
            registry.register(strategy);
        }
        registry
    }

    /// Register under the strategy's own name, replacing any previous entry
    pub fn register<S: Strategy + 'static>(&mut self, strategy: S) -> &mut Self {
        let name = strategy.name().to_string();
        self.strategies.insert(name, Arc::new(strategy));
        self
    }

    /// Register under an explicit name
    pub fn register_as(&mut self, name: impl Into<String>, strategy: Arc<dyn Strategy>) -> &mut Self {
        self.strategies.insert(name.into(), strategy);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Resolve the strategy a faction plays; missing entries are fatal
    pub fn resolve(&self, faction: &str, strategy: &str) -> Result<Arc<dyn Strategy>> {
        self.strategies
            .get(strategy)
            .cloned()
            .ok_or_else(|| WargameError::UnknownStrategy {
                faction: faction.to_string(),
                strategy: strategy.to_string(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

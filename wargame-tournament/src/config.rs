//! Configuration types for a simulation run
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};
use wargame_core::{PayoffRule, Result, WargameError};

/// How agents are paired each round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingScheme {
    /// Uniform random perfect matching; with an odd population the
    /// leftover agent sits out the round (bye)
    #[default]
    Matching,
    /// Zip the agents against a random derangement of themselves; every
    /// agent plays once as player and once as opponent
    Permutation,
}

/// Denominator used when normalizing an epoch's running totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Divide every faction's total by the whole world population
    #[default]
    TotalPopulation,
    /// Divide each faction's total by that faction's own population
    FactionPopulation,
}

/// Population feedback between epochs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Agents gained (or lost) per unit of normalized epoch score
    pub scale_factor: f64,
}

impl FeedbackConfig {
    pub const DEFAULT_SCALE_FACTOR: f64 = 10.0;

    pub fn new(scale_factor: f64) -> Self {
        Self { scale_factor }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE_FACTOR)
    }
}

/// Run parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of epochs to run
    pub epochs: usize,
    /// Rounds played inside each epoch
    pub rounds_per_epoch: usize,
    /// Scalar the faction shares are multiplied by
    pub world_population: u64,
    /// Population feedback (None = shares fixed for the whole run)
    pub feedback: Option<FeedbackConfig>,
    /// Normalization denominator
    pub normalization: Normalization,
    /// Pairing scheme
    pub pairing: PairingScheme,
    /// Payoff rule applied to every encounter
    pub payoff: PayoffRule,
    /// Resolve the skirmishes of a round on the rayon pool
    pub parallel: bool,
    /// Random seed (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            rounds_per_epoch: 100,
            world_population: 5000,
            feedback: None,
            normalization: Normalization::TotalPopulation,
            pairing: PairingScheme::Matching,
            payoff: PayoffRule::classic(),
            parallel: false,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Largest world population a run accepts
    pub const MAX_WORLD_POPULATION: u64 = 100_000_000;

    /// Create config with the given shape
    pub fn new(epochs: usize, rounds_per_epoch: usize, world_population: u64) -> Self {
        Self {
            epochs,
            rounds_per_epoch,
            world_population,
            ..Default::default()
        }
    }

    /// Enable population feedback
    pub fn with_feedback(mut self, scale_factor: f64) -> Self {
        self.feedback = Some(FeedbackConfig::new(scale_factor));
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_pairing(mut self, pairing: PairingScheme) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_payoff(mut self, payoff: PayoffRule) -> Self {
        self.payoff = payoff;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn feedback_enabled(&self) -> bool {
        self.feedback.is_some()
    }

    /// Reject parameters the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(WargameError::InvalidParameter("epochs must be positive".to_string()));
        }
        if self.rounds_per_epoch == 0 {
            return Err(WargameError::InvalidParameter(
                "rounds_per_epoch must be positive".to_string(),
            ));
        }
        if self.world_population == 0 {
            return Err(WargameError::InvalidParameter(
                "world_population must be positive".to_string(),
            ));
        }
        if self.world_population > Self::MAX_WORLD_POPULATION {
            return Err(WargameError::InvalidParameter(format!(
                "world_population must be at most {}, got {}",
                Self::MAX_WORLD_POPULATION,
                self.world_population
            )));
        }
        if let Some(feedback) = &self.feedback {
            if !feedback.scale_factor.is_finite() || feedback.scale_factor < 0.0 {
                return Err(WargameError::InvalidParameter(format!(
                    "scale_factor must be finite and non-negative, got {}",
                    feedback.scale_factor
                )));
            }
        }
        Ok(())
    }
}

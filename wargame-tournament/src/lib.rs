//! Wargame Tournament - Epoch/round simulation engine
//!
//! This crate runs the evolutionary tournament:
//! - Population expansion into individual agents
//! - Random pairing each round
//! - Skirmish resolution and payoff scoring
//! - Epoch aggregation and normalization
//! - Optional population feedback between epochs
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: Wargame::run (orchestration)
//! - Level 2: run_epoch, apply_feedback (phases)
//! - Level 3: expand_population, pair_agents, resolve_skirmish (steps)
//! - Level 4: utilities, configuration

mod config;
mod epoch;
mod feedback;
mod pairing;
mod population;
mod results;
mod skirmish;
mod wargame;

pub use config::{FeedbackConfig, Normalization, PairingScheme, RunConfig};
pub use epoch::{run_epoch, EpochOutcome};
pub use feedback::apply_feedback;
pub use pairing::{pair_agents, Pairing};
pub use population::{expand_population, AgentId, Population};
pub use results::{EpochRow, ResultsTable};
pub use skirmish::{resolve_skirmish, SeatedFaction, SkirmishOutcome};
pub use wargame::Wargame;

//! Wargame Core - Vocabulary of the iterated social-dilemma game
//!
//! This crate provides the pieces the engine is assembled from:
//! - Actions and the payoff rule that scores them
//! - The strategy interface and the built-in strategy catalog
//! - The strategy registry (faction name -> strategy)
//! - Faction configuration loading
//! - The shared error type

pub mod action;
pub mod error;
pub mod faction;
pub mod payoff;
pub mod strategy;

// Re-exports for convenient access
pub use action::Action;
pub use error::{Result, StrategyError, WargameError};
pub use faction::{FactionConfig, FactionEntry};
pub use payoff::PayoffRule;
pub use strategy::{BuiltinStrategy, Strategy, StrategyRegistry};

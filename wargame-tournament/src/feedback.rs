//! Population feedback - rebalance factions from epoch performance
//!
//! Level 2 - Phase-level implementation

use crate::config::FeedbackConfig;
use crate::population::Population;

/// Grow or shrink each faction by its normalized score times the scale
/// factor, flooring at zero
///
/// A faction driven to zero contributes no agents (and so no score) until
/// a later update lifts it again, which with a zero score never happens.
pub fn apply_feedback(population: &mut Population, scores: &[f64], feedback: &FeedbackConfig) {
    for (count, &score) in population.counts_mut().iter_mut().zip(scores) {
        *count = (*count + score * feedback.scale_factor).max(0.0);
    }
}

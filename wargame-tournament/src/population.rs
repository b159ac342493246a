//! Population state and expansion into individual agents
//!
//! Level 3 - Step-level implementation

use serde::{Deserialize, Serialize};
use wargame_core::{FactionEntry, Result, WargameError};

/// One agent, identified only by the faction it belongs to
///
/// Agents are fungible within a faction; the index is the faction's
/// position in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(usize);

impl AgentId {
    pub fn new(faction: usize) -> Self {
        Self(faction)
    }

    pub fn faction(self) -> usize {
        self.0
    }
}

/// Per-faction population counts
///
/// Counts are fractional so repeated feedback updates do not lose the
/// sub-agent remainder; expansion rounds them to whole agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    names: Vec<String>,
    counts: Vec<f64>,
}

impl Population {
    /// Scale declared shares by the world population
    pub fn from_shares(factions: &[FactionEntry], world_population: u64) -> Result<Self> {
        let names = factions.iter().map(|f| f.name.clone()).collect();
        let counts = factions
            .iter()
            .map(|f| {
                check_count(&f.name, f.share)?;
                Ok(f.share * world_population as f64)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { names, counts })
    }

    /// Use raw per-faction counts
    pub fn from_counts(names: Vec<String>, counts: Vec<f64>) -> Result<Self> {
        if names.len() != counts.len() {
            return Err(WargameError::InvalidParameter(format!(
                "{} faction names for {} counts",
                names.len(),
                counts.len()
            )));
        }
        for (name, &count) in names.iter().zip(&counts) {
            check_count(name, count)?;
        }
        Ok(Self { names, counts })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fractional counts
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub(crate) fn counts_mut(&mut self) -> &mut [f64] {
        &mut self.counts
    }

    /// Whole agents per faction (nearest integer, never negative)
    pub fn agent_counts(&self) -> Vec<u64> {
        self.counts.iter().map(|&c| c.max(0.0).round() as u64).collect()
    }

    /// Total whole agents
    pub fn total(&self) -> u64 {
        self.agent_counts().into_iter().fold(0, u64::saturating_add)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

fn check_count(faction: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(WargameError::InvalidPopulation {
            faction: faction.to_string(),
            value,
        });
    }
    Ok(())
}

/// Lay out one agent per whole population unit, grouped by faction in
/// declaration order
pub fn expand_population(population: &Population) -> Vec<AgentId> {
    let counts = population.agent_counts();
    let total = counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
    let mut agents = Vec::with_capacity(total as usize);

    for (faction, &count) in counts.iter().enumerate() {
        agents.extend((0..count).map(|_| AgentId::new(faction)));
    }

    agents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factions(shares: &[(&str, f64)]) -> Vec<FactionEntry> {
        shares.iter().map(|&(n, s)| FactionEntry::new(n, s)).collect()
    }

    #[test]
    fn test_from_shares_scales() {
        let population =
            Population::from_shares(&factions(&[("a", 0.25), ("b", 0.75)]), 1000).unwrap();
        assert_eq!(population.agent_counts(), vec![250, 750]);
        assert_eq!(population.total(), 1000);
    }

    #[test]
    fn test_rounds_to_nearest() {
        let population =
            Population::from_shares(&factions(&[("a", 0.333), ("b", 0.667)]), 10).unwrap();
        // 3.33 -> 3, 6.67 -> 7
        assert_eq!(population.agent_counts(), vec![3, 7]);
    }

    #[test]
    fn test_shares_need_not_sum_to_one() {
        let population =
            Population::from_shares(&factions(&[("a", 0.5), ("b", 0.2)]), 100).unwrap();
        assert_eq!(population.total(), 70);
    }

    #[test]
    fn test_negative_share_rejected() {
        let err = Population::from_shares(&factions(&[("a", 0.5), ("b", -0.1)]), 100)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            WargameError::InvalidPopulation { ref faction, .. } if faction == "b"
        ));
    }

    #[test]
    fn test_non_finite_count_rejected() {
        let result = Population::from_counts(vec!["a".to_string()], vec![f64::INFINITY]);
        assert!(matches!(result, Err(WargameError::InvalidPopulation { .. })));
    }

    #[test]
    fn test_from_counts_length_mismatch() {
        let result = Population::from_counts(vec!["a".to_string()], vec![1.0, 2.0]);
        assert!(matches!(result, Err(WargameError::InvalidParameter(_))));
    }

    #[test]
    fn test_expand_groups_in_declaration_order() {
        let population = Population::from_counts(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![2.0, 0.0, 3.0],
        )
        .unwrap();

        let agents = expand_population(&population);
        let factions: Vec<usize> = agents.iter().map(|a| a.faction()).collect();
        assert_eq!(factions, vec![0, 0, 2, 2, 2]);
    }

    #[test]
    fn test_total_saturates_on_huge_counts() {
        let population = Population::from_counts(
            vec!["a".to_string(), "b".to_string()],
            vec![1e30, 1e30],
        )
        .unwrap();
        assert_eq!(population.total(), u64::MAX);
    }

    #[test]
    fn test_expand_empty() {
        let population = Population::from_counts(vec!["a".to_string()], vec![0.4]).unwrap();
        assert!(expand_population(&population).is_empty());
    }
}

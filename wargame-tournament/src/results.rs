//! Results table - one row per completed epoch

use serde::{Deserialize, Serialize};

use crate::epoch::EpochOutcome;

/// Scores of one epoch, columns in faction declaration order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochRow {
    /// Zero-based epoch number
    pub epoch: usize,
    /// Whole agents per faction during the epoch
    pub populations: Vec<u64>,
    /// Unnormalized running totals
    pub raw_scores: Vec<i64>,
    /// Normalized scores
    pub scores: Vec<f64>,
}

/// Append-only table of epoch rows
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    factions: Vec<String>,
    rows: Vec<EpochRow>,
}

impl ResultsTable {
    pub fn new(factions: Vec<String>) -> Self {
        Self {
            factions,
            rows: Vec::new(),
        }
    }

    /// Append the next epoch's row
    pub fn push(&mut self, outcome: EpochOutcome) -> &EpochRow {
        let epoch = self.rows.len();
        self.rows.push(EpochRow {
            epoch,
            populations: outcome.populations,
            raw_scores: outcome.raw_scores,
            scores: outcome.scores,
        });
        &self.rows[epoch]
    }

    pub fn factions(&self) -> &[String] {
        &self.factions
    }

    pub fn rows(&self) -> &[EpochRow] {
        &self.rows
    }

    pub fn last(&self) -> Option<&EpochRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn faction_index(&self, faction: &str) -> Option<usize> {
        self.factions.iter().position(|f| f == faction)
    }

    /// Normalized score of a faction in an epoch
    pub fn score(&self, epoch: usize, faction: &str) -> Option<f64> {
        let index = self.faction_index(faction)?;
        self.rows.get(epoch).map(|row| row.scores[index])
    }

    /// A row as (faction, score) pairs
    pub fn row_scores(&self, epoch: usize) -> Option<Vec<(&str, f64)>> {
        self.rows.get(epoch).map(|row| {
            self.factions
                .iter()
                .map(String::as_str)
                .zip(row.scores.iter().copied())
                .collect()
        })
    }

    /// One faction's score across all epochs
    pub fn column(&self, faction: &str) -> Option<Vec<f64>> {
        let index = self.faction_index(faction)?;
        Some(self.rows.iter().map(|row| row.scores[index]).collect())
    }

    /// Per-faction sum of normalized scores over the run
    pub fn cumulative(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.factions.len()];
        for row in &self.rows {
            for (total, score) in totals.iter_mut().zip(&row.scores) {
                *total += score;
            }
        }
        totals
    }

    /// Total agents per epoch
    pub fn total_populations(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.populations.iter().sum()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(scores: &[f64]) -> EpochOutcome {
        EpochOutcome {
            populations: vec![10; scores.len()],
            raw_scores: scores.iter().map(|s| (s * 20.0) as i64).collect(),
            scores: scores.to_vec(),
        }
    }

    #[test]
    fn test_rows_numbered_in_order() {
        let mut table = ResultsTable::new(vec!["a".to_string(), "b".to_string()]);
        assert!(table.is_empty());

        table.push(outcome(&[0.5, -0.5]));
        let row = table.push(outcome(&[1.0, 0.0]));
        assert_eq!(row.epoch, 1);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].epoch, 0);
        assert_eq!(table.last().map(|r| r.epoch), Some(1));
    }

    #[test]
    fn test_accessors() {
        let mut table = ResultsTable::new(vec!["a".to_string(), "b".to_string()]);
        table.push(outcome(&[0.5, -0.5]));
        table.push(outcome(&[1.0, 0.25]));

        assert_eq!(table.score(1, "b"), Some(0.25));
        assert_eq!(table.score(2, "b"), None);
        assert_eq!(table.score(0, "c"), None);
        assert_eq!(table.column("a"), Some(vec![0.5, 1.0]));
        assert_eq!(table.cumulative(), vec![1.5, -0.25]);
        assert_eq!(table.row_scores(0), Some(vec![("a", 0.5), ("b", -0.5)]));
        assert_eq!(table.total_populations(), vec![20, 20]);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut table = ResultsTable::new(vec!["a".to_string()]);
        table.push(outcome(&[0.5]));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["factions"][0], "a");
        assert_eq!(json["rows"][0]["scores"][0], 0.5);

        let back: ResultsTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}

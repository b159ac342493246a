//! Faction configuration - named population shares
//!
//! The document is a JSON object keyed by faction name:
//!
//! ```json
//! {
//!     "tit_for_tat": { "population": 0.5 },
//!     "hawks": { "population": 0.5, "strategy": "always_defect" }
//! }
//! ```
//!
//! Declaration order is kept; it fixes column order in the results table
//! and the order agents are laid out in.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WargameError};

/// One faction as declared in the configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionEntry {
    pub name: String,
    /// Relative share of the world population
    pub share: f64,
    /// Registry name of the strategy this faction plays
    pub strategy: String,
}

impl FactionEntry {
    /// Faction playing the strategy of the same name
    pub fn new(name: impl Into<String>, share: f64) -> Self {
        let name = name.into();
        Self {
            strategy: name.clone(),
            name,
            share,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }
}

/// Body of one faction entry in the document
#[derive(Deserialize)]
struct RawEntry {
    population: f64,
    #[serde(default)]
    strategy: Option<String>,
}

/// Ordered set of factions
#[derive(Clone, Debug, PartialEq)]
pub struct FactionConfig {
    factions: Vec<FactionEntry>,
}

impl FactionConfig {
    pub fn new(factions: Vec<FactionEntry>) -> Self {
        Self { factions }
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            WargameError::ConfigLoadFailure {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json_str(&content)
    }

    /// Parse the JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Map<String, Value> =
            serde_json::from_str(content).map_err(|e| WargameError::ConfigParse(e.to_string()))?;

        if document.is_empty() {
            return Err(WargameError::ConfigParse("no factions declared".to_string()));
        }

        let factions = document
            .into_iter()
            .map(|(name, body)| {
                let raw: RawEntry = serde_json::from_value(body)
                    .map_err(|e| WargameError::ConfigParse(format!("faction '{}': {}", name, e)))?;
                let strategy = raw.strategy.unwrap_or_else(|| name.clone());
                Ok(FactionEntry {
                    name,
                    share: raw.population,
                    strategy,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { factions })
    }

    pub fn factions(&self) -> &[FactionEntry] {
        &self.factions
    }

    pub fn names(&self) -> Vec<String> {
        self.factions.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Sum of declared shares (not required to be 1)
    pub fn total_share(&self) -> f64 {
        self.factions.iter().map(|f| f.share).sum()
    }
}

//! Actions available in a single encounter

use serde::{Deserialize, Serialize};
use std::fmt;

/// A move in one encounter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    /// The other action
    pub fn opposite(self) -> Self {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cooperate => write!(f, "cooperate"),
            Action::Defect => write!(f, "defect"),
        }
    }
}

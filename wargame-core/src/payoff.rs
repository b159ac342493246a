//! Payoff rule - scores an ordered pair of actions
//!
//! The rule is the single source of truth for encounter scoring. It is not
//! zero-sum: exploiting a cooperator pays more than the cooperator loses.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Score deltas for the four outcome categories of a 2x2 social dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffRule {
    /// Both cooperate (each side)
    pub reward: i64,
    /// Both defect (each side)
    pub punishment: i64,
    /// Cooperated against a defector
    pub sucker: i64,
    /// Defected against a cooperator
    pub temptation: i64,
}

impl Default for PayoffRule {
    fn default() -> Self {
        Self::classic()
    }
}

impl PayoffRule {
    pub fn new(reward: i64, punishment: i64, sucker: i64, temptation: i64) -> Self {
        Self {
            reward,
            punishment,
            sucker,
            temptation,
        }
    }

    /// +1/+1, -2/-2, -1/+2
    pub fn classic() -> Self {
        Self::new(1, -2, -1, 2)
    }

    /// +1/+1, -1/-1, 0/+2
    pub fn mild() -> Self {
        Self::new(1, -1, 0, 2)
    }

    /// Deltas for (player, opponent)
    pub fn score(&self, player: Action, opponent: Action) -> (i64, i64) {
        match (player, opponent) {
            (Action::Cooperate, Action::Cooperate) => (self.reward, self.reward),
            (Action::Defect, Action::Defect) => (self.punishment, self.punishment),
            (Action::Cooperate, Action::Defect) => (self.sucker, self.temptation),
            (Action::Defect, Action::Cooperate) => (self.temptation, self.sucker),
        }
    }

    /// Combined delta of both sides for one encounter
    pub fn joint_score(&self, player: Action, opponent: Action) -> i64 {
        let (p, o) = self.score(player, opponent);
        p + o
    }

    /// Whether the rule forms a prisoner's dilemma (T > R > P > S)
    pub fn is_dilemma(&self) -> bool {
        self.temptation > self.reward
            && self.reward > self.punishment
            && self.punishment > self.sucker
    }
}

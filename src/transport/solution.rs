//! Solutions found by the search

use super::{Direction, Move, State, Step};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One trip together with the states it connects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionStep {
    #[serde(rename = "move")]
    pub mv: Move,
    pub before: State,
    pub after: State,
}

impl SolutionStep {
    pub fn direction(&self) -> Direction {
        Direction::leaving(self.before.side)
    }
}

/// Ordered trips from the initial state to the final state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Solution {
    pub steps: Vec<SolutionStep>,
}

impl Solution {
    pub fn new(steps: Vec<SolutionStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.steps.iter().map(|s| &s.mv)
    }

    /// Every state visited, starting with the initial one
    pub fn states(&self) -> Vec<&State> {
        let mut states = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.first() {
            states.push(&first.before);
        }
        states.extend(self.steps.iter().map(|s| &s.after));
        states
    }

    /// The same trips as untrusted steps, for re-verification
    pub fn to_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .map(|s| Step::new(s.mv.amounts.clone(), s.direction()))
            .collect()
    }

    pub fn is_cycle_free(&self) -> bool {
        let states = self.states();
        let unique: HashSet<_> = states.iter().collect();
        unique.len() == states.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

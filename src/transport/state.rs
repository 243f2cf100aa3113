//! Banks, shuttle moves and puzzle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of the shuttle (and of the individuals counted in a state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Start,
    Target,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Start => Side::Target,
            Side::Target => Side::Start,
        }
    }

    /// Bank name used in step lines
    pub fn bank_text(self) -> &'static str {
        match self {
            Side::Start => "left",
            Side::Target => "right",
        }
    }

    /// Atom used in the compiled program
    pub fn atom(self) -> &'static str {
        match self {
            Side::Start => "start",
            Side::Target => "target",
        }
    }

    pub fn from_atom(atom: &str) -> Option<Self> {
        match atom {
            "start" => Some(Side::Start),
            "target" => Some(Side::Target),
            _ => None,
        }
    }
}

/// Declared direction of a candidate step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToTarget,
    ToStart,
}

impl Direction {
    /// Bank the shuttle must be on for this direction
    pub fn departs_from(self) -> Side {
        match self {
            Direction::ToTarget => Side::Start,
            Direction::ToStart => Side::Target,
        }
    }

    pub fn leaving(side: Side) -> Self {
        match side {
            Side::Start => Direction::ToTarget,
            Side::Target => Direction::ToStart,
        }
    }

    pub fn atom(self) -> &'static str {
        match self {
            Direction::ToTarget => "to_target",
            Direction::ToStart => "to_start",
        }
    }
}

/// One shuttle trip: how many of each species travel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub amounts: Vec<u32>,
}

impl Move {
    pub fn new(amounts: Vec<u32>) -> Self {
        Self { amounts }
    }

    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.amounts)
    }
}

/// Predator/prey pair resolved to species indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threat {
    pub predator: usize,
    pub prey: usize,
}

impl Threat {
    /// Prey on a bank is safe when absent or at least as numerous as the predator.
    pub fn bank_ok(predators: u32, prey: u32) -> bool {
        prey == 0 || prey >= predators
    }

    /// Checks both banks of `counts` against this pair
    pub fn holds(&self, counts: &[u32], initial: &[u32]) -> bool {
        let pred_here = counts[self.predator];
        let prey_here = counts[self.prey];
        let pred_there = initial[self.predator] - pred_here;
        let prey_there = initial[self.prey] - prey_here;
        Self::bank_ok(pred_here, prey_here) && Self::bank_ok(pred_there, prey_there)
    }
}

/// Individuals still on the start bank, and where the shuttle is
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub counts: Vec<u32>,
    pub side: Side,
}

impl State {
    /// Everyone on the start bank, shuttle at start
    pub fn initial(initial_counts: &[u32]) -> Self {
        Self {
            counts: initial_counts.to_vec(),
            side: Side::Start,
        }
    }

    /// Nobody left at start, shuttle at target
    pub fn terminal(species: usize) -> Self {
        Self {
            counts: vec![0; species],
            side: Side::Target,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.side == Side::Target && self.counts.iter().all(|&c| c == 0)
    }

    /// Counts on the target bank
    pub fn target_counts(&self, initial_counts: &[u32]) -> Vec<u32> {
        initial_counts
            .iter()
            .zip(&self.counts)
            .map(|(total, here)| total - here)
            .collect()
    }

    /// Applies `mv` in the direction the shuttle is facing.
    ///
    /// Returns `None` when the move would take more individuals than are on
    /// the departure bank. Safety is not checked here.
    pub fn apply(&self, mv: &Move, initial_counts: &[u32]) -> Option<State> {
        if mv.amounts.len() != self.counts.len() {
            return None;
        }

        let mut next = Vec::with_capacity(self.counts.len());
        match self.side {
            Side::Start => {
                for (&here, &amount) in self.counts.iter().zip(&mv.amounts) {
                    next.push(here.checked_sub(amount)?);
                }
            }
            Side::Target => {
                for ((&here, &amount), &total) in
                    self.counts.iter().zip(&mv.amounts).zip(initial_counts)
                {
                    let back = here.checked_add(amount)?;
                    if back > total {
                        return None;
                    }
                    next.push(back);
                }
            }
        }

        Some(State {
            counts: next,
            side: self.side.opposite(),
        })
    }

    pub fn is_safe(&self, threats: &[Threat], initial_counts: &[u32]) -> bool {
        threats.iter().all(|t| t.holds(&self.counts, initial_counts))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state(")?;
        write_list(f, &self.counts)?;
        write!(f, ", {})", self.side.atom())
    }
}

/// Untrusted step: amounts plus an explicit direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub amounts: Vec<u32>,
    pub direction: Direction,
}

impl Step {
    pub fn new(amounts: Vec<u32>, direction: Direction) -> Self {
        Self { amounts, direction }
    }

    pub fn as_move(&self) -> Move {
        Move::new(self.amounts.clone())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step(")?;
        write_list(f, &self.amounts)?;
        write!(f, ", {})", self.direction.atom())
    }
}

/// Writes `[a,b,c]` in program list syntax
pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, values: &[u32]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", v)?;
    }
    write!(f, "]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_both_directions() {
        let initial = [2, 2];
        let start = State::initial(&initial);

        let there = start.apply(&Move::new(vec![0, 2]), &initial).unwrap();
        assert_eq!(there.counts, vec![2, 0]);
        assert_eq!(there.side, Side::Target);

        let back = there.apply(&Move::new(vec![0, 1]), &initial).unwrap();
        assert_eq!(back.counts, vec![2, 1]);
        assert_eq!(back.side, Side::Start);
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let initial = [2, 1];
        let start = State::initial(&initial);
        assert!(start.apply(&Move::new(vec![0, 2]), &initial).is_none());

        let there = State { counts: vec![2, 1], side: Side::Target };
        // nothing on the target bank to bring back
        assert!(there.apply(&Move::new(vec![1, 0]), &initial).is_none());
    }

    #[test]
    fn test_threat_checks_both_banks() {
        let initial = [3, 3];
        let threat = Threat { predator: 1, prey: 0 };

        assert!(threat.holds(&[3, 3], &initial));
        // start bank: 1 prey vs 2 predators
        assert!(!threat.holds(&[1, 2], &initial));
        // start bank fine, target bank: 1 prey vs 2 predators
        assert!(!threat.holds(&[2, 1], &initial));
        // prey absent on start, predators alone there
        assert!(threat.holds(&[0, 3], &initial));
    }

    #[test]
    fn test_bank_without_predators_is_safe() {
        assert!(Threat::bank_ok(0, 1));
        assert!(Threat::bank_ok(0, 0));
        assert!(Threat::bank_ok(5, 0));
        assert!(!Threat::bank_ok(2, 1));
    }

    #[test]
    fn test_terms() {
        let state = State { counts: vec![2, 0], side: Side::Target };
        assert_eq!(state.to_string(), "state([2,0], target)");

        let step = Step::new(vec![1, 1], Direction::ToStart);
        assert_eq!(step.to_string(), "step([1,1], to_start)");
        assert!(State::terminal(2).is_terminal());
        assert!(!State::initial(&[1, 0]).is_terminal());
    }
}

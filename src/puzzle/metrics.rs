//! Difficulty estimate for a puzzle instance

use super::PuzzleConfig;
use crate::program::move_count;
use serde::Serialize;

/// Rough difficulty figures for a puzzle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyEstimate {
    /// Size of the instance: species, population and capacity pressure
    pub complication: f64,
    /// Logical load of the safety relationships
    pub complexity: f64,
    pub overall: f64,
    pub category: DifficultyCategory,
    pub species_count: usize,
    pub total_individuals: u64,
    pub capacity: u32,
    pub relationship_count: usize,
    pub move_count: usize,
    pub state_space: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifficultyCategory {
    Trivial,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl DifficultyCategory {
    fn from_score(score: f64) -> Self {
        if score < 10.0 {
            DifficultyCategory::Trivial
        } else if score < 50.0 {
            DifficultyCategory::Easy
        } else if score < 200.0 {
            DifficultyCategory::Medium
        } else if score < 500.0 {
            DifficultyCategory::Hard
        } else {
            DifficultyCategory::VeryHard
        }
    }
}

impl DifficultyEstimate {
    pub fn analyze(config: &PuzzleConfig) -> Self {
        let species_count = config.species.len();
        let total = config.total_individuals();
        let capacity = config.capacity;

        let complication = if species_count == 0 || capacity == 0 {
            0.0
        } else {
            let species_factor = (species_count as f64).powf(1.2);
            let capacity_factor = (total as f64 / capacity as f64).powf(0.8);
            round2(species_factor * total as f64 * capacity_factor / 10.0)
        };

        let complexity = relationship_complexity(config.relationships.len());
        let overall = round2(complication * (1.0 + complexity / 10.0));

        Self {
            complication,
            complexity,
            overall,
            category: DifficultyCategory::from_score(overall),
            species_count,
            total_individuals: total,
            capacity,
            relationship_count: config.relationships.len(),
            move_count: move_count(species_count, capacity),
            state_space: config.state_space_size(),
        }
    }
}

/// Each binary relationship weighs 1; every one past the first adds 20% for interaction
fn relationship_complexity(count: usize) -> f64 {
    let base = count as f64;
    if count > 1 {
        round2(base * (1.0 + (count - 1) as f64 * 0.2))
    } else {
        base
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl std::fmt::Display for DifficultyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DifficultyCategory::Trivial => "Trivial",
            DifficultyCategory::Easy => "Easy",
            DifficultyCategory::Medium => "Medium",
            DifficultyCategory::Hard => "Hard",
            DifficultyCategory::VeryHard => "Very Hard",
        };
        write!(f, "{}", label)
    }
}

impl std::fmt::Display for DifficultyEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Difficulty Estimate:")?;
        writeln!(f, "  Overall: {} ({})", self.overall, self.category)?;
        writeln!(f, "  Complication: {} | Complexity: {}", self.complication, self.complexity)?;
        writeln!(
            f,
            "  Species: {} | Individuals: {} | Capacity: {}",
            self.species_count, self.total_individuals, self.capacity
        )?;
        if self.relationship_count > 0 {
            writeln!(f, "  Relationships: {} binary", self.relationship_count)?;
        } else {
            writeln!(f, "  Relationships: none (unconstrained)")?;
        }
        writeln!(f, "  Legal moves: {}", self.move_count)?;
        writeln!(f, "  State space: {} states", self.state_space)?;
        Ok(())
    }
}

//! Generate and solve many puzzles in parallel

use super::TransportProblem;
use crate::config::Settings;
use crate::puzzle::{DifficultyCategory, DifficultyEstimate, PuzzleConfig};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Outcome for one seed
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub seed: u64,
    pub config: PuzzleConfig,
    pub difficulty: f64,
    pub category: DifficultyCategory,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Solved { solutions: usize, shortest: usize },
    Unsolvable,
    Failed { reason: String },
}

/// Puzzles for seeds `first_seed..first_seed + count`, reported in seed order
pub fn run_batch(settings: &Settings, first_seed: u64, count: usize) -> Vec<BatchEntry> {
    (0..count)
        .into_par_iter()
        .map(|offset| run_one(settings, first_seed.wrapping_add(offset as u64)))
        .collect()
}

fn run_one(settings: &Settings, seed: u64) -> BatchEntry {
    let config = settings.generator.generate_with_seed(seed);
    let estimate = DifficultyEstimate::analyze(&config);

    let outcome = match TransportProblem::new(settings.clone(), config.clone()) {
        Ok(problem) => match problem.solve() {
            Ok(report) => match report.shortest() {
                Some(shortest) => BatchOutcome::Solved {
                    solutions: report.solutions.len(),
                    shortest,
                },
                None => BatchOutcome::Unsolvable,
            },
            Err(e) => BatchOutcome::Failed {
                reason: format!("{:#}", e),
            },
        },
        Err(e) => BatchOutcome::Failed {
            reason: format!("{:#}", e),
        },
    };
    debug!(seed, ?outcome, "batch puzzle finished");

    BatchEntry {
        seed,
        config,
        difficulty: estimate.overall,
        category: estimate.category,
        outcome,
    }
}

/// Aggregate counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub solved: usize,
    pub unsolvable: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match entry.outcome {
                BatchOutcome::Solved { .. } => summary.solved += 1,
                BatchOutcome::Unsolvable => summary.unsolvable += 1,
                BatchOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOutcome::Solved { solutions, shortest } => {
                write!(f, "{} solutions, shortest {} steps", solutions, shortest)
            }
            BatchOutcome::Unsolvable => write!(f, "no solution"),
            BatchOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch Results:")?;
        writeln!(f, "  Total puzzles: {}", self.total)?;
        writeln!(f, "  Solved: {}", self.solved)?;
        writeln!(f, "  Unsolvable: {}", self.unsolvable)?;
        writeln!(f, "  Failed: {}", self.failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings() -> Settings {
        let mut settings = Settings::default();
        settings.generator.species = 2;
        settings.generator.individuals = Some(2);
        settings.generator.relationships = 1;
        settings.generator.capacity = Some(2);
        settings.solver.max_solutions = Some(3);
        settings
    }

    #[test]
    fn test_batch_in_seed_order() {
        let entries = run_batch(&small_settings(), 10, 6);
        let seeds: Vec<u64> = entries.iter().map(|e| e.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let first = run_batch(&small_settings(), 3, 4);
        let second = run_batch(&small_settings(), 3, 4);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.config, b.config);
            assert_eq!(a.outcome, b.outcome);
        }
    }

    #[test]
    fn test_summary_counts() {
        let entries = run_batch(&small_settings(), 0, 5);
        let summary = BatchSummary::from_entries(&entries);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.solved + summary.unsolvable + summary.failed, 5);
    }
}

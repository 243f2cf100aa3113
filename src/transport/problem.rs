//! Transport problem definition: compile once, then solve or verify

use super::{Solution, SolutionCodec, SolutionValidator, ValidationResult};
use crate::config::Settings;
use crate::program::{compile, CompileStatistics, CompiledProgram, SearchEngine};
use crate::puzzle::{describe, load_puzzle, DifficultyEstimate, PuzzleConfig};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// A puzzle together with its compiled program and a configured engine
pub struct TransportProblem {
    settings: Settings,
    config: PuzzleConfig,
    program: CompiledProgram,
    engine: SearchEngine,
}

/// Solutions of one solve call
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub minimal_only: bool,
    pub solutions: Vec<Solution>,
    /// Each solution as step lines
    pub lines: Vec<Vec<String>>,
    #[serde(skip)]
    pub solve_time: Duration,
}

impl TransportProblem {
    /// Create a problem from an explicit puzzle
    pub fn new(settings: Settings, config: PuzzleConfig) -> Result<Self> {
        let program = compile(&config).context("Failed to compile puzzle")?;
        let engine = SearchEngine::new(settings.limits());

        Ok(Self {
            settings,
            config,
            program,
            engine,
        })
    }

    /// Create a problem from a puzzle JSON file or a problem statement
    pub fn from_file<P: AsRef<Path>>(settings: Settings, path: P) -> Result<Self> {
        let config = load_puzzle(path).context("Failed to load puzzle file")?;
        Self::new(settings, config)
    }

    /// Generate a fresh puzzle from the generator settings
    pub fn generate(settings: Settings) -> Result<Self> {
        let config = settings.generator.generate();
        Self::new(settings, config)
    }

    /// Solve with the configured limits; only shortest solutions when `minimal_only`
    pub fn solve(&self) -> Result<SolveReport> {
        let start_time = Instant::now();
        let minimal_only = self.settings.solver.minimal_only;

        let solutions = if minimal_only {
            self.engine.solve_minimal_solutions(&self.program)
        } else {
            self.engine.solve_solutions(&self.program)
        }
        .context("Search failed")?;

        let codec = self.codec();
        let lines = solutions.iter().map(|s| codec.encode(s)).collect();
        let solve_time = start_time.elapsed();

        info!(
            solutions = solutions.len(),
            minimal_only,
            elapsed_ms = solve_time.as_millis() as u64,
            "solved puzzle"
        );

        Ok(SolveReport {
            minimal_only,
            solutions,
            lines,
            solve_time,
        })
    }

    /// `false` for undecodable or invalid candidates
    pub fn verify<S: AsRef<str>>(&self, lines: &[S]) -> Result<bool> {
        self.engine
            .verify(&self.program, &self.config, lines)
            .context("Verification query failed")
    }

    /// Verify candidate text with one step per line
    pub fn verify_text(&self, text: &str) -> Result<bool> {
        let lines: Vec<&str> = text.lines().collect();
        self.verify(&lines)
    }

    /// Verify with a reason for rejection
    pub fn validate<S: AsRef<str>>(&self, lines: &[S]) -> Result<ValidationResult> {
        Ok(SolutionValidator::new(&self.config)?.validate(lines))
    }

    pub fn difficulty(&self) -> DifficultyEstimate {
        DifficultyEstimate::analyze(&self.config)
    }

    pub fn statistics(&self) -> &CompileStatistics {
        &self.program.statistics
    }

    /// Problem statement for an external solver
    pub fn describe(&self) -> String {
        describe(&self.config)
    }

    pub fn codec(&self) -> SolutionCodec {
        SolutionCodec::new(self.program.species.clone())
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl SolveReport {
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn shortest(&self) -> Option<usize> {
        self.solutions.iter().map(Solution::len).min()
    }
}

impl std::fmt::Display for SolveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solve Report:")?;
        writeln!(f, "  Solutions: {}", self.solutions.len())?;
        if let Some(shortest) = self.shortest() {
            writeln!(f, "  Shortest: {} steps", shortest)?;
        }
        writeln!(f, "  Minimal only: {}", self.minimal_only)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{save_config_to_file, Relationship, Species};
    use tempfile::tempdir;

    fn create_test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.solver.max_solutions = None;
        settings
    }

    fn guarded() -> PuzzleConfig {
        PuzzleConfig::new(
            vec![Species::new("a", 2), Species::new("b", 2)],
            vec![Relationship::new("b", "a")],
            2,
        )
    }

    #[test]
    fn test_problem_solves_and_verifies() {
        let problem = TransportProblem::new(create_test_settings(), guarded()).unwrap();
        let report = problem.solve().unwrap();

        assert!(!report.is_empty());
        assert_eq!(report.lines.len(), report.solutions.len());
        assert_eq!(report.shortest(), Some(5));
        for lines in &report.lines {
            assert!(problem.verify(lines).unwrap());
            assert!(problem.validate(lines).unwrap().is_valid);
        }
    }

    #[test]
    fn test_minimal_only() {
        let mut settings = create_test_settings();
        settings.solver.minimal_only = true;
        let problem = TransportProblem::new(settings, guarded()).unwrap();

        let report = problem.solve().unwrap();
        assert!(report.solutions.iter().all(|s| s.len() == 5));
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut config = guarded();
        config.capacity = 0;
        assert!(TransportProblem::new(create_test_settings(), config).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("puzzle.json");
        save_config_to_file(&guarded(), &path).unwrap();

        let problem = TransportProblem::from_file(create_test_settings(), &path).unwrap();
        assert_eq!(problem.config(), &guarded());
        assert_eq!(problem.statistics().move_facts, 5);
    }

    #[test]
    fn test_verify_text_with_labels() {
        let problem = TransportProblem::new(create_test_settings(), guarded()).unwrap();
        let text = "Step 1: 2 b cross left -> right\n\nStep 2: 1 b cross right -> left\nStep 3: 2 a cross left -> right\nStep 4: 1 b cross right -> left\nStep 5: 2 b cross left -> right\n";
        assert!(problem.verify_text(text).unwrap());
        assert!(!problem.verify_text("2 b cross up -> down").unwrap());
    }

    #[test]
    fn test_describe_mentions_capacity() {
        let problem = TransportProblem::new(create_test_settings(), guarded()).unwrap();
        assert!(problem.describe().contains("capacity 2"));
    }
}

//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::transport::{BatchEntry, Side, Solution, SolveReport, State};
use anyhow::{Context, Result};
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Format a single solution: its step lines and, optionally, every bank state
    pub fn format_solution(
        index: usize,
        solution: &Solution,
        lines: &[String],
        species: &[String],
        show_states: bool,
    ) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Solution {} ({} steps) ===\n", index + 1, solution.len()));
        for (i, (line, step)) in lines.iter().zip(&solution.steps).enumerate() {
            output.push_str(&format!("Step {}: {}\n", i + 1, line));
            if show_states {
                output.push_str(&format!("        {}\n", Self::format_state(&step.after, species, solution)));
            }
        }

        output
    }

    /// Both banks of a state, with the shuttle marked
    pub fn format_state(state: &State, species: &[String], solution: &Solution) -> String {
        let initial = solution
            .steps
            .first()
            .map(|s| s.before.counts.clone())
            .unwrap_or_else(|| state.counts.clone());
        let target = state.target_counts(&initial);

        let bank = |counts: &[u32]| {
            let parts: Vec<String> = counts
                .iter()
                .zip(species)
                .filter(|(&c, _)| c > 0)
                .map(|(c, name)| format!("{} {}", c, name))
                .collect();
            if parts.is_empty() {
                "-".to_string()
            } else {
                parts.join(", ")
            }
        };

        let (left_mark, right_mark) = match state.side {
            Side::Start => ("*", " "),
            Side::Target => (" ", "*"),
        };
        format!(
            "left{} [{}] | right{} [{}]",
            left_mark,
            bank(&state.counts),
            right_mark,
            bank(&target)
        )
    }

    /// Format a solve report as a summary table
    pub fn format_solution_summary(report: &SolveReport) -> String {
        let mut output = String::new();

        output.push_str("Solutions Summary:\n");
        output.push_str("#    | Steps | First trip\n");
        output.push_str("-----|-------|------------------------------\n");

        for (i, lines) in report.lines.iter().enumerate() {
            output.push_str(&format!(
                "{:4} | {:5} | {}\n",
                i + 1,
                lines.len(),
                lines.first().map(String::as_str).unwrap_or("-")
            ));
        }

        output
    }

    /// One row per batch entry
    pub fn format_batch(entries: &[BatchEntry]) -> String {
        let mut output = String::new();
        output.push_str("Seed       | Species | Capacity | Difficulty        | Outcome\n");
        output.push_str("-----------|---------|----------|-------------------|------------------------\n");
        for entry in entries {
            output.push_str(&format!(
                "{:10} | {:7} | {:8} | {:7.1} {:9} | {}\n",
                entry.seed,
                entry.config.species.len(),
                entry.config.capacity,
                entry.difficulty,
                entry.category.to_string(),
                entry.outcome
            ));
        }
        output
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(
        report: &SolveReport,
        program_text: &str,
        output_dir: P,
        format: &OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                for (i, lines) in report.lines.iter().enumerate() {
                    let filepath = output_dir.join(format!("solution_{:03}.txt", i + 1));
                    std::fs::write(&filepath, lines.join("\n") + "\n")
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }
            }
            OutputFormat::Json => {
                let filepath = output_dir.join("solutions.json");
                let json = serde_json::to_string_pretty(report).context("Failed to serialize solutions")?;
                std::fs::write(&filepath, json)
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
            }
            OutputFormat::Program => {
                let filepath = output_dir.join("puzzle.pl");
                std::fs::write(&filepath, program_text)
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }

    /// Headings in multi-part output
    pub fn heading(text: &str) -> String {
        Self::colored(text, Color::Cyan)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Cyan,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Cyan => 36,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::compile;
    use crate::puzzle::{PuzzleConfig, Species};
    use crate::transport::TransportProblem;
    use crate::config::Settings;
    use tempfile::tempdir;

    fn pets_report() -> (TransportProblem, SolveReport) {
        let config = PuzzleConfig::new(vec![Species::new("cats", 2), Species::new("dogs", 1)], vec![], 3);
        let mut settings = Settings::default();
        settings.solver.minimal_only = true;
        let problem = TransportProblem::new(settings, config).unwrap();
        let report = problem.solve().unwrap();
        (problem, report)
    }

    #[test]
    fn test_solution_formatting() {
        let (problem, report) = pets_report();
        let text = SolutionFormatter::format_solution(
            0,
            &report.solutions[0],
            &report.lines[0],
            &problem.program().species,
            true,
        );
        assert!(text.contains("Step 1: 2 cats, 1 dogs cross left -> right"));
        assert!(text.contains("left  [-] | right* [2 cats, 1 dogs]"));
    }

    #[test]
    fn test_summary_table() {
        let (_, report) = pets_report();
        let summary = SolutionFormatter::format_solution_summary(&report);
        assert!(summary.contains("2 cats, 1 dogs cross left -> right"));
    }

    #[test]
    fn test_save_formats() {
        let (problem, report) = pets_report();
        let dir = tempdir().unwrap();

        SolutionFormatter::save_solutions(&report, &problem.program().text, dir.path(), &OutputFormat::Text).unwrap();
        let text = std::fs::read_to_string(dir.path().join("solution_001.txt")).unwrap();
        assert_eq!(text, "2 cats, 1 dogs cross left -> right\n");

        SolutionFormatter::save_solutions(&report, &problem.program().text, dir.path(), &OutputFormat::Json).unwrap();
        assert!(dir.path().join("solutions.json").exists());

        let program = compile(problem.config()).unwrap();
        SolutionFormatter::save_solutions(&report, &program.text, dir.path(), &OutputFormat::Program).unwrap();
        let saved = std::fs::read_to_string(dir.path().join("puzzle.pl")).unwrap();
        assert!(saved.contains("solve_solution(Steps)"));
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
    }
}

//! Transport Puzzle Compiler, Solver and Verifier
//!
//! Generates river-crossing style transport puzzles, compiles each one into a
//! self-contained logic program, enumerates safe solutions over that program
//! and verifies candidate solutions written as step lines.

pub mod config;
pub mod error;
pub mod program;
pub mod puzzle;
pub mod transport;
pub mod utils;

pub use config::Settings;
pub use error::{CompileError, ConsultError, DecodeError, EngineError, QueryError};
pub use program::{compile, CompiledProgram, SearchEngine, SearchLimits};
pub use puzzle::{ConfigGenerator, PuzzleConfig, Relationship, Species};
pub use transport::{Solution, SolutionCodec, TransportProblem};

use anyhow::Result;

/// Compile and solve a puzzle, returning every solution as step lines
pub fn solve_puzzle(config: &PuzzleConfig, limits: SearchLimits) -> Result<Vec<Vec<String>>> {
    let program = compile(config)?;
    Ok(SearchEngine::new(limits).solve(&program)?)
}

/// Compile a puzzle and check one candidate against it
pub fn verify_solution<S: AsRef<str>>(config: &PuzzleConfig, lines: &[S]) -> Result<bool> {
    let program = compile(config)?;
    Ok(SearchEngine::default().verify(&program, config, lines)?)
}

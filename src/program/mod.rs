//! Compiled logic programs and the search engine that runs them

pub mod arena;
pub mod compiler;
pub mod engine;
pub mod knowledge;
pub mod moves;
pub mod term;

pub use compiler::{compile, CompileStatistics, CompiledProgram, ProgramCompiler, MAX_MOVE_FACTS};
pub use engine::{check_goal, SearchEngine, SearchLimits, Solutions, DEFAULT_MAX_EXPANSIONS};
pub use knowledge::KnowledgeBase;
pub use moves::{move_count, MoveSet};

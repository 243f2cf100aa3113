//! Shuttle states, solutions, step lines and the problem façade

pub mod batch;
pub mod codec;
pub mod problem;
pub mod solution;
pub mod state;
pub mod validator;

pub use batch::{run_batch, BatchEntry, BatchOutcome, BatchSummary};
pub use codec::{normalize_line, SolutionCodec};
pub use problem::{SolveReport, TransportProblem};
pub use solution::{Solution, SolutionStep};
pub use state::{Direction, Move, Side, State, Step, Threat};
pub use validator::{SolutionValidator, ValidationResult, Violation};

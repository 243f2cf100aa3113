//! Error kinds for compiling, loading, querying and decoding

use thiserror::Error;

/// A `PuzzleConfig` that cannot be turned into a program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("puzzle has no species")]
    NoSpecies,

    #[error("shuttle capacity must be positive")]
    ZeroCapacity,

    #[error("invalid species name `{0}` (expected letters, digits or underscores)")]
    InvalidName(String),

    #[error("species `{0}` is listed more than once")]
    DuplicateSpecies(String),

    #[error("relationship references unknown species `{0}`")]
    UnknownSpecies(String),

    #[error("species `{0}` cannot be its own predator")]
    SelfRelationship(String),

    #[error("relationship {predator} -> {prey} is listed more than once")]
    DuplicateRelationship { predator: String, prey: String },

    #[error("puzzle has {moves} legal moves, more than the {limit} the compiler emits")]
    TooManyMoves { moves: usize, limit: usize },
}

/// The program text failed to load
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsultError {
    #[error("clause {clause}: {message}")]
    Syntax { clause: usize, message: String },

    #[error("program defines no `{0}` clause")]
    MissingPredicate(&'static str),

    #[error("inconsistent program: {0}")]
    Inconsistent(String),
}

/// A fault raised while running a query against a loaded program
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("search aborted after {limit} expansions")]
    ExpansionLimit { limit: u64 },

    #[error("step {step} has {found} amounts, program expects {expected}")]
    ArityMismatch { step: usize, expected: usize, found: usize },
}

/// A candidate step line that does not follow the step grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty step line")]
    Empty,

    #[error("missing ` cross ` separator in `{0}`")]
    MissingCross(String),

    #[error("invalid direction `{0}` (expected `left -> right` or `right -> left`)")]
    InvalidDirection(String),

    #[error("malformed amount segment `{0}`")]
    MalformedSegment(String),

    #[error("unknown species `{0}`")]
    UnknownSpecies(String),
}

/// Failure of a `solve` or `verify` call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Consult(#[from] ConsultError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

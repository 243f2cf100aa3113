//! Compiles a puzzle into a self-contained logic program

use super::{move_count, MoveSet};
use crate::error::CompileError;
use crate::puzzle::PuzzleConfig;
use crate::transport::{State, Threat};
use itertools::Itertools;
use std::fmt;
use tracing::debug;

/// Largest move set the compiler will emit as facts
pub const MAX_MOVE_FACTS: usize = 1_000_000;

/// Shared rules: safety helpers, list arithmetic, transitions, search and checking
const RULES: &str = r"not_outnumbered(Counts, Init, Pred, Prey) :-
    nth0(Pred, Counts, PredHere),
    nth0(Prey, Counts, PreyHere),
    nth0(Pred, Init, PredTotal),
    nth0(Prey, Init, PreyTotal),
    PredThere is PredTotal - PredHere,
    PreyThere is PreyTotal - PreyHere,
    bank_ok(PredHere, PreyHere),
    bank_ok(PredThere, PreyThere).

bank_ok(_, 0) :- !.
bank_ok(Pred, Prey) :-
    Prey >= Pred.

subtract_counts([], [], []).
subtract_counts([C|Cs], [M|Ms], [R|Rs]) :-
    R is C - M,
    R >= 0,
    subtract_counts(Cs, Ms, Rs).

add_counts([], [], [], []).
add_counts([C|Cs], [M|Ms], [I|Is], [R|Rs]) :-
    R is C + M,
    R =< I,
    add_counts(Cs, Ms, Is, Rs).

transition_with_move(state(Counts, start), state(Next, target), Move) :-
    move(Move),
    subtract_counts(Counts, Move, Next),
    safe(state(Next, target)).
transition_with_move(state(Counts, target), state(Next, start), Move) :-
    move(Move),
    init_counts(Init),
    add_counts(Counts, Move, Init, Next),
    safe(state(Next, start)).

path(State, _, []) :-
    final_state(State).
path(State, Visited, [step(Move, State, Next)|Rest]) :-
    transition_with_move(State, Next, Move),
    \+ memberchk(Next, Visited),
    path(Next, [Next|Visited], Rest).

solve_solution(Steps) :-
    initial_state(Start),
    path(Start, [Start], Steps).

check_solution(State, []) :-
    final_state(State).
check_solution(State, [step(Move, Direction)|Rest]) :-
    \+ final_state(State),
    direction_side(Direction, State),
    transition_with_move(State, Next, Move),
    check_solution(Next, Rest).

direction_side(to_target, state(_, start)).
direction_side(to_start, state(_, target)).
";

/// Translates a validated `PuzzleConfig` into program text
#[derive(Debug)]
pub struct ProgramCompiler<'a> {
    config: &'a PuzzleConfig,
    threats: Vec<Threat>,
    moves: MoveSet,
}

/// Output of the compiler: program text plus the name table needed to read results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub text: String,
    pub species: Vec<String>,
    pub statistics: CompileStatistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileStatistics {
    pub species: usize,
    pub capacity: u32,
    pub move_facts: usize,
    pub safety_clauses: usize,
    pub state_space: u128,
}

impl<'a> ProgramCompiler<'a> {
    /// Rejects malformed configs before any text is produced
    pub fn new(config: &'a PuzzleConfig) -> Result<Self, CompileError> {
        let threats = config.resolve_threats()?;
        let count = move_count(config.species.len(), config.capacity);
        if count > MAX_MOVE_FACTS {
            return Err(CompileError::TooManyMoves {
                moves: count,
                limit: MAX_MOVE_FACTS,
            });
        }
        let moves = MoveSet::enumerate(config.species.len(), config.capacity);
        Ok(Self {
            config,
            threats,
            moves,
        })
    }

    pub fn moves(&self) -> &MoveSet {
        &self.moves
    }

    /// Same config, same text
    pub fn compile(&self) -> CompiledProgram {
        let mut text = String::new();
        text.push_str(&self.header());
        text.push('\n');
        text.push_str(&self.move_facts());
        text.push('\n');
        text.push_str(&self.boundary_facts());
        text.push('\n');
        text.push_str(&self.safety_predicate());
        text.push('\n');
        text.push_str(RULES);

        let statistics = self.statistics();
        debug!(
            moves = statistics.move_facts,
            safety_clauses = statistics.safety_clauses,
            bytes = text.len(),
            "compiled puzzle program"
        );

        CompiledProgram {
            text,
            species: self.config.species_names(),
            statistics,
        }
    }

    pub fn statistics(&self) -> CompileStatistics {
        CompileStatistics {
            species: self.config.species.len(),
            capacity: self.config.capacity,
            move_facts: self.moves.len(),
            safety_clauses: self.threats.len(),
            state_space: self.config.state_space_size(),
        }
    }

    fn header(&self) -> String {
        let mut text = format!(
            "% transport puzzle: {} species, shuttle capacity {}\n",
            self.config.species.len(),
            self.config.capacity
        );
        for (i, species) in self.config.species.iter().enumerate() {
            text.push_str(&format!(
                "% species {}: {} ({} individuals)\n",
                i, species.name, species.count
            ));
        }
        for rel in &self.config.relationships {
            text.push_str(&format!("% {} must not outnumber {}\n", rel.predator, rel.prey));
        }
        text
    }

    fn move_facts(&self) -> String {
        let mut text = String::new();
        for mv in &self.moves {
            text.push_str(&format!("move({}).\n", mv));
        }
        text
    }

    fn boundary_facts(&self) -> String {
        let initial = self.config.initial_counts();
        format!(
            "init_counts([{}]).\ninitial_state({}).\nfinal_state({}).\n",
            initial.iter().join(","),
            State::initial(&initial),
            State::terminal(initial.len())
        )
    }

    /// One `not_outnumbered/4` goal per relationship; none means always safe
    fn safety_predicate(&self) -> String {
        if self.threats.is_empty() {
            return "safe(state(_, _)).\n".to_string();
        }

        let goals = self
            .threats
            .iter()
            .map(|t| format!("    not_outnumbered(Counts, Init, {}, {})", t.predator, t.prey))
            .join(",\n");
        format!("safe(state(Counts, _)) :-\n    init_counts(Init),\n{}.\n", goals)
    }
}

impl fmt::Display for CompiledProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Display for CompileStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program Statistics:")?;
        writeln!(f, "  Species: {}", self.species)?;
        writeln!(f, "  Capacity: {}", self.capacity)?;
        writeln!(f, "  Move facts: {}", self.move_facts)?;
        writeln!(f, "  Safety clauses: {}", self.safety_clauses)?;
        writeln!(f, "  State space: {} states", self.state_space)?;
        Ok(())
    }
}

/// Validate and compile in one call
pub fn compile(config: &PuzzleConfig) -> Result<CompiledProgram, CompileError> {
    Ok(ProgramCompiler::new(config)?.compile())
}

//! Search over a consulted program: solution enumeration and candidate checking

use super::arena::{NodeId, StateArena};
use super::{CompiledProgram, KnowledgeBase};
use crate::error::{ConsultError, EngineError, QueryError};
use crate::puzzle::PuzzleConfig;
use crate::transport::{Move, Solution, SolutionCodec, SolutionStep, State, Step};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_EXPANSIONS: u64 = 2_000_000;

/// Bounds on how much work one query may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Stop after this many solutions (no error)
    pub max_solutions: Option<usize>,
    /// Ignore paths longer than this many trips
    pub max_steps: Option<usize>,
    /// Abort with `QueryError::ExpansionLimit` after this many transition attempts
    pub max_expansions: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_solutions: None,
            max_steps: None,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

#[derive(Debug)]
struct Frame {
    node: NodeId,
    next_move: usize,
    via: Option<usize>,
}

/// Lazy depth-first enumeration of cycle-free paths from the initial state.
///
/// Moves are tried in fact order, so results come out in the same order a
/// backtracking `solve_solution/1` query would produce them. A path is never
/// extended past the final state. After an `Err` the iterator is exhausted.
#[derive(Debug)]
pub struct Solutions<'kb> {
    kb: &'kb KnowledgeBase,
    arena: StateArena,
    stack: Vec<Frame>,
    max_steps: Option<usize>,
    max_expansions: u64,
    expansions: u64,
    truncated: bool,
    done: bool,
}

impl<'kb> Solutions<'kb> {
    pub fn new(kb: &'kb KnowledgeBase, max_steps: Option<usize>, max_expansions: u64) -> Self {
        let mut arena = StateArena::new();
        let root = arena.intern(kb.initial_state().clone());
        arena.set_on_path(root, true);

        Self {
            kb,
            arena,
            stack: vec![Frame {
                node: root,
                next_move: 0,
                via: None,
            }],
            max_steps,
            max_expansions,
            expansions: 0,
            truncated: false,
            done: false,
        }
    }

    /// Transition attempts made so far
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    pub fn states_seen(&self) -> usize {
        self.arena.len()
    }

    /// Whether the step bound cut off any branch
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn solution(&self, last_move: usize, last_node: NodeId) -> Solution {
        let moves = self.kb.moves();
        let mut steps = Vec::with_capacity(self.stack.len());
        let mut prev = self.stack[0].node;
        for frame in &self.stack[1..] {
            if let Some(via) = frame.via {
                steps.push(self.step(moves[via].clone(), prev, frame.node));
            }
            prev = frame.node;
        }
        steps.push(self.step(moves[last_move].clone(), prev, last_node));
        Solution::new(steps)
    }

    fn step(&self, mv: Move, before: NodeId, after: NodeId) -> SolutionStep {
        SolutionStep {
            mv,
            before: self.arena.get(before).clone(),
            after: self.arena.get(after).clone(),
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Result<Solution, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let kb = self.kb;
        let moves = kb.moves();

        loop {
            if self.stack.is_empty() {
                self.done = true;
                return None;
            }

            let top = self.stack.len() - 1;
            let at_bound = self.max_steps.is_some_and(|max| top >= max);
            let frame = &mut self.stack[top];

            if at_bound || frame.next_move >= moves.len() {
                if at_bound && !moves.is_empty() {
                    self.truncated = true;
                }
                let node = frame.node;
                self.stack.pop();
                self.arena.set_on_path(node, false);
                continue;
            }

            let move_idx = frame.next_move;
            frame.next_move += 1;
            let node = frame.node;

            self.expansions += 1;
            if self.expansions > self.max_expansions {
                self.done = true;
                warn!(limit = self.max_expansions, "search expansion budget exhausted");
                return Some(Err(QueryError::ExpansionLimit {
                    limit: self.max_expansions,
                }));
            }

            let Some(next) = kb.transition(self.arena.get(node), &moves[move_idx]) else {
                continue;
            };
            let next_id = self.arena.intern(next);
            if self.arena.on_path(next_id) {
                continue;
            }
            if self.arena.get(next_id) == kb.final_state() {
                return Some(Ok(self.solution(move_idx, next_id)));
            }

            self.arena.set_on_path(next_id, true);
            self.stack.push(Frame {
                node: next_id,
                next_move: 0,
                via: Some(move_idx),
            });
        }
    }
}

/// Runs `solve` and `verify` queries against compiled programs
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    limits: SearchLimits,
}

impl SearchEngine {
    pub fn new(limits: SearchLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn consult(&self, program: &CompiledProgram) -> Result<KnowledgeBase, ConsultError> {
        KnowledgeBase::consult(&program.text)
    }

    /// Lazy enumeration honouring the step and expansion bounds
    pub fn enumerate<'kb>(&self, kb: &'kb KnowledgeBase) -> Solutions<'kb> {
        Solutions::new(kb, self.limits.max_steps, self.limits.max_expansions)
    }

    /// Every cycle-free solution in depth-first order, or an error and nothing
    pub fn solve_solutions(&self, program: &CompiledProgram) -> Result<Vec<Solution>, EngineError> {
        let kb = self.consult(program)?;
        let mut search = self.enumerate(&kb);
        let cap = self.limits.max_solutions.unwrap_or(usize::MAX);

        let solutions = search.by_ref().take(cap).collect::<Result<Vec<_>, _>>()?;
        info!(
            solutions = solutions.len(),
            expansions = search.expansions(),
            states = search.states_seen(),
            "solve finished"
        );
        Ok(solutions)
    }

    /// Solutions rendered as step lines
    pub fn solve(&self, program: &CompiledProgram) -> Result<Vec<Vec<String>>, EngineError> {
        let codec = SolutionCodec::new(program.species.clone());
        Ok(self
            .solve_solutions(program)?
            .iter()
            .map(|s| codec.encode(s))
            .collect())
    }

    /// All solutions of the smallest length, found by iterative deepening
    pub fn solve_minimal_solutions(
        &self,
        program: &CompiledProgram,
    ) -> Result<Vec<Solution>, EngineError> {
        let kb = self.consult(program)?;
        let ceiling = self
            .limits
            .max_steps
            .unwrap_or_else(|| usize::try_from(path_ceiling(kb.init_counts())).unwrap_or(usize::MAX));
        let cap = self.limits.max_solutions.unwrap_or(usize::MAX);
        let mut budget = self.limits.max_expansions;

        for bound in 1..=ceiling {
            let mut search = Solutions::new(&kb, Some(bound), budget);
            let found = search
                .by_ref()
                .take(cap)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| QueryError::ExpansionLimit {
                    limit: self.limits.max_expansions,
                })?;
            budget = budget.saturating_sub(search.expansions());
            debug!(bound, found = found.len(), budget, "deepening pass");

            if !found.is_empty() {
                info!(steps = bound, solutions = found.len(), "minimal solutions found");
                return Ok(found);
            }
            if !search.truncated() {
                break;
            }
        }

        info!("no solution within bounds");
        Ok(Vec::new())
    }

    pub fn solve_minimal(&self, program: &CompiledProgram) -> Result<Vec<Vec<String>>, EngineError> {
        let codec = SolutionCodec::new(program.species.clone());
        Ok(self
            .solve_minimal_solutions(program)?
            .iter()
            .map(|s| codec.encode(s))
            .collect())
    }

    /// `check_solution/2` for already-decoded steps
    pub fn check(&self, kb: &KnowledgeBase, steps: &[Step]) -> Result<bool, QueryError> {
        let mut state = kb.initial_state().clone();

        for (idx, step) in steps.iter().enumerate() {
            if step.amounts.len() != kb.species() {
                return Err(QueryError::ArityMismatch {
                    step: idx + 1,
                    expected: kb.species(),
                    found: step.amounts.len(),
                });
            }
            // a path ends at the final state; anything after it is rejected
            if &state == kb.final_state() {
                debug!(step = idx + 1, "candidate continues past the final state");
                return Ok(false);
            }
            if step.direction.departs_from() != state.side || !kb.is_move(&step.amounts) {
                debug!(step = idx + 1, %step, "step is not a legal move here");
                return Ok(false);
            }
            match kb.transition(&state, &step.as_move()) {
                Some(next) => state = next,
                None => {
                    debug!(step = idx + 1, %step, "transition rejected");
                    return Ok(false);
                }
            }
        }

        Ok(&state == kb.final_state())
    }

    /// Decode, then check a candidate. Undecodable text is `Ok(false)`.
    pub fn verify<S: AsRef<str>>(
        &self,
        program: &CompiledProgram,
        config: &PuzzleConfig,
        lines: &[S],
    ) -> Result<bool, EngineError> {
        let kb = self.consult(program)?;
        let codec = SolutionCodec::new(config.species_names());

        let steps = match codec.decode_lines(lines) {
            Ok(steps) => steps,
            Err(err) => {
                info!(error = %err, "candidate could not be decoded");
                return Ok(false);
            }
        };

        debug!(goal = %check_goal(kb.initial_state(), &steps), "running verification query");
        let valid = self.check(&kb, &steps)?;
        info!(steps = steps.len(), valid, "verification finished");
        Ok(valid)
    }
}

/// Text of the verification goal, for logs
pub fn check_goal(initial: &State, steps: &[Step]) -> String {
    format!("check_solution({}, [{}])", initial, steps.iter().join(","))
}

/// Upper bound on the length of a cycle-free path
fn path_ceiling(init_counts: &[u32]) -> u128 {
    init_counts
        .iter()
        .fold(2u128, |acc, &c| acc.saturating_mul(u128::from(c) + 1))
        .saturating_sub(1)
}

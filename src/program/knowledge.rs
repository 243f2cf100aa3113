//! Loading ("consulting") a compiled program into queryable form

use super::term::{parse_term, split_clauses, Term};
use crate::error::ConsultError;
use crate::transport::{Move, Side, State, Threat};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Predicate families every loaded program must define
const REQUIRED: [(&str, usize); 9] = [
    ("move", 1),
    ("init_counts", 1),
    ("initial_state", 1),
    ("final_state", 1),
    ("safe", 1),
    ("transition_with_move", 3),
    ("path", 3),
    ("solve_solution", 1),
    ("check_solution", 2),
];

/// Facts and safety constraints recovered from program text
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    moves: Vec<Move>,
    legal: HashSet<Vec<u32>>,
    init_counts: Vec<u32>,
    initial: State,
    terminal: State,
    threats: Vec<Threat>,
    predicates: BTreeSet<(String, usize)>,
}

impl KnowledgeBase {
    /// Parse and check a program
    pub fn consult(text: &str) -> Result<Self, ConsultError> {
        let clauses = split_clauses(text).map_err(|message| ConsultError::Syntax {
            clause: 0,
            message,
        })?;

        let mut predicates = BTreeSet::new();
        let mut moves = Vec::new();
        let mut init_counts = None;
        let mut initial = None;
        let mut terminal = None;
        let mut safety: Option<Vec<Threat>> = None;

        for (idx, clause) in clauses.iter().enumerate() {
            let number = idx + 1;
            let syntax = |message: String| ConsultError::Syntax {
                clause: number,
                message,
            };

            let head = parse_term(&clause.head).map_err(syntax)?;
            let (name, arity) = head
                .functor()
                .ok_or_else(|| syntax(format!("`{}` is not a valid clause head", clause.head)))?;
            predicates.insert((name.to_string(), arity));

            match (name, arity, clause.body.is_empty()) {
                ("move", 1, true) => {
                    moves.push(Move::new(counts_of(&head.args()[0]).ok_or_else(|| {
                        syntax(format!("move fact `{}` is not a count list", clause.head))
                    })?));
                }
                ("init_counts", 1, true) => {
                    let counts = counts_of(&head.args()[0])
                        .ok_or_else(|| syntax("init_counts is not a count list".to_string()))?;
                    set_once(&mut init_counts, counts, "init_counts")?;
                }
                ("initial_state", 1, true) => {
                    let state = state_of(&head.args()[0])
                        .ok_or_else(|| syntax("initial_state is not a state term".to_string()))?;
                    set_once(&mut initial, state, "initial_state")?;
                }
                ("final_state", 1, true) => {
                    let state = state_of(&head.args()[0])
                        .ok_or_else(|| syntax("final_state is not a state term".to_string()))?;
                    set_once(&mut terminal, state, "final_state")?;
                }
                ("safe", 1, _) => {
                    let threats = safety_goals(&clause.body).map_err(syntax)?;
                    set_once(&mut safety, threats, "safe")?;
                }
                _ => {}
            }
        }

        for (name, arity) in REQUIRED {
            if !predicates.contains(&(name.to_string(), arity)) {
                return Err(ConsultError::MissingPredicate(name));
            }
        }

        let kb = Self::assemble(
            moves,
            init_counts.ok_or(ConsultError::MissingPredicate("init_counts"))?,
            initial.ok_or(ConsultError::MissingPredicate("initial_state"))?,
            terminal.ok_or(ConsultError::MissingPredicate("final_state"))?,
            safety.ok_or(ConsultError::MissingPredicate("safe"))?,
            predicates,
        )?;

        debug!(
            clauses = clauses.len(),
            moves = kb.moves.len(),
            threats = kb.threats.len(),
            "consulted program"
        );
        Ok(kb)
    }

    fn assemble(
        moves: Vec<Move>,
        init_counts: Vec<u32>,
        initial: State,
        terminal: State,
        threats: Vec<Threat>,
        predicates: BTreeSet<(String, usize)>,
    ) -> Result<Self, ConsultError> {
        let n = init_counts.len();
        let inconsistent = |msg: String| Err(ConsultError::Inconsistent(msg));

        if let Some(bad) = moves.iter().find(|m| m.len() != n) {
            return inconsistent(format!("move {} does not have {} amounts", bad, n));
        }
        if initial != State::initial(&init_counts) {
            return inconsistent(format!("initial state {} does not match init_counts", initial));
        }
        if terminal != State::terminal(n) {
            return inconsistent(format!("final state {} is not the empty target state", terminal));
        }
        if let Some(bad) = threats
            .iter()
            .find(|t| t.predator >= n || t.prey >= n || t.predator == t.prey)
        {
            return inconsistent(format!(
                "safety pair ({}, {}) is out of range for {} species",
                bad.predator, bad.prey, n
            ));
        }

        let legal = moves.iter().map(|m| m.amounts.clone()).collect();
        Ok(Self {
            moves,
            legal,
            init_counts,
            initial,
            terminal,
            threats,
            predicates,
        })
    }

    pub fn species(&self) -> usize {
        self.init_counts.len()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn init_counts(&self) -> &[u32] {
        &self.init_counts
    }

    pub fn initial_state(&self) -> &State {
        &self.initial
    }

    pub fn final_state(&self) -> &State {
        &self.terminal
    }

    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    pub fn defines(&self, name: &str, arity: usize) -> bool {
        self.predicates.contains(&(name.to_string(), arity))
    }

    /// `move/1` membership
    pub fn is_move(&self, amounts: &[u32]) -> bool {
        self.legal.contains(amounts)
    }

    pub fn is_safe(&self, state: &State) -> bool {
        state.is_safe(&self.threats, &self.init_counts)
    }

    /// `transition_with_move/3` for a known move: apply it and require safety
    pub fn transition(&self, state: &State, mv: &Move) -> Option<State> {
        let next = state.apply(mv, &self.init_counts)?;
        self.is_safe(&next).then_some(next)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, name: &'static str) -> Result<(), ConsultError> {
    if slot.is_some() {
        return Err(ConsultError::Inconsistent(format!("`{}` is defined more than once", name)));
    }
    *slot = Some(value);
    Ok(())
}

fn counts_of(term: &Term) -> Option<Vec<u32>> {
    term.as_int_list()?
        .into_iter()
        .map(|v| u32::try_from(v).ok())
        .collect()
}

fn state_of(term: &Term) -> Option<State> {
    match term {
        Term::Compound(name, args) if name == "state" && args.len() == 2 => Some(State {
            counts: counts_of(&args[0])?,
            side: Side::from_atom(args[1].as_atom()?)?,
        }),
        _ => None,
    }
}

/// Body of the `safe/1` clause: `init_counts/1` plus one `not_outnumbered/4` per pair
fn safety_goals(body: &[String]) -> Result<Vec<Threat>, String> {
    let mut threats = Vec::new();
    for goal in body {
        let term = parse_term(goal)?;
        match term.functor() {
            Some(("init_counts", 1)) => {}
            Some(("not_outnumbered", 4)) => {
                let index = |t: &Term| t.as_int().and_then(|v| usize::try_from(v).ok());
                let args = term.args();
                match (index(&args[2]), index(&args[3])) {
                    (Some(predator), Some(prey)) => threats.push(Threat { predator, prey }),
                    _ => return Err(format!("safety goal `{}` needs integer indices", goal)),
                }
            }
            _ => return Err(format!("unsupported safety goal `{}`", goal)),
        }
    }
    Ok(threats)
}

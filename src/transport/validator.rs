//! Step-by-step validation of candidate solutions with failure reasons

use super::{normalize_line, Direction, Side, SolutionCodec, State, Step};
use crate::puzzle::PuzzleConfig;
use crate::transport::Threat;
use anyhow::Result;
use std::fmt;

/// Checks candidates directly against a `PuzzleConfig`, reporting the first
/// rule a candidate breaks. Accepts exactly what `SearchEngine::verify` accepts.
pub struct SolutionValidator<'a> {
    config: &'a PuzzleConfig,
    threats: Vec<Threat>,
    codec: SolutionCodec,
}

/// Why a candidate was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Undecodable { line: usize, message: String },
    PastFinal { step: usize },
    WrongDirection { step: usize, shuttle_at: Side },
    EmptyTrip { step: usize },
    OverCapacity { step: usize, total: u32, capacity: u32 },
    Insufficient { step: usize, species: String, requested: u32, available: u32 },
    Outnumbered { step: usize, bank: Side, predator: String, prey: String },
    NotFinished { remaining: Vec<(String, u32)> },
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub steps_checked: usize,
    /// States reached, starting with the initial state
    pub states: Vec<State>,
    pub violation: Option<Violation>,
}

impl<'a> SolutionValidator<'a> {
    pub fn new(config: &'a PuzzleConfig) -> Result<Self> {
        let threats = config.resolve_threats()?;
        Ok(Self {
            config,
            threats,
            codec: SolutionCodec::new(config.species_names()),
        })
    }

    /// Validate candidate step lines
    pub fn validate<S: AsRef<str>>(&self, lines: &[S]) -> ValidationResult {
        let mut steps = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            let Some(line) = normalize_line(line.as_ref()) else {
                continue;
            };
            match self.codec.decode_line(line) {
                Ok(step) => steps.push(step),
                Err(err) => {
                    return self.rejected(
                        0,
                        vec![State::initial(&self.config.initial_counts())],
                        Violation::Undecodable {
                            line: idx + 1,
                            message: err.to_string(),
                        },
                    )
                }
            }
        }
        self.validate_steps(&steps)
    }

    /// Validate already-decoded steps
    pub fn validate_steps(&self, steps: &[Step]) -> ValidationResult {
        let initial = self.config.initial_counts();
        let terminal = State::terminal(initial.len());
        let mut state = State::initial(&initial);
        let mut states = vec![state.clone()];

        for (idx, step) in steps.iter().enumerate() {
            let number = idx + 1;
            if state == terminal {
                return self.rejected(idx, states, Violation::PastFinal { step: number });
            }
            if let Some(violation) = self.check_step(number, &state, step) {
                return self.rejected(idx, states, violation);
            }

            let Some(next) = state.apply(&step.as_move(), &initial) else {
                let violation = self.shortage(number, &state, step);
                return self.rejected(idx, states, violation);
            };
            if let Some(violation) = self.check_safety(number, &next, &initial) {
                return self.rejected(idx, states, violation);
            }

            states.push(next.clone());
            state = next;
        }

        if state != terminal {
            let remaining = self
                .config
                .species
                .iter()
                .zip(&state.counts)
                .filter(|(_, &c)| c > 0)
                .map(|(s, &c)| (s.name.clone(), c))
                .collect();
            return self.rejected(steps.len(), states, Violation::NotFinished { remaining });
        }

        ValidationResult {
            is_valid: true,
            steps_checked: steps.len(),
            states,
            violation: None,
        }
    }

    /// Whether the candidate is valid, without diagnostics
    pub fn quick_validate<S: AsRef<str>>(&self, lines: &[S]) -> bool {
        self.validate(lines).is_valid
    }

    fn check_step(&self, number: usize, state: &State, step: &Step) -> Option<Violation> {
        if step.direction.departs_from() != state.side {
            return Some(Violation::WrongDirection {
                step: number,
                shuttle_at: state.side,
            });
        }
        let total: u32 = step.amounts.iter().fold(0u32, |acc, &a| acc.saturating_add(a));
        if total == 0 {
            return Some(Violation::EmptyTrip { step: number });
        }
        if total > self.config.capacity {
            return Some(Violation::OverCapacity {
                step: number,
                total,
                capacity: self.config.capacity,
            });
        }
        None
    }

    fn shortage(&self, number: usize, state: &State, step: &Step) -> Violation {
        let initial = self.config.initial_counts();
        let available = match step.direction {
            Direction::ToTarget => state.counts.clone(),
            Direction::ToStart => state.target_counts(&initial),
        };
        let (idx, requested, available) = step
            .amounts
            .iter()
            .zip(&available)
            .enumerate()
            .find(|(_, (&want, &have))| want > have)
            .map(|(i, (&want, &have))| (i, want, have))
            .unwrap_or((0, 0, 0));

        Violation::Insufficient {
            step: number,
            species: self.config.species[idx].name.clone(),
            requested,
            available,
        }
    }

    fn check_safety(&self, number: usize, next: &State, initial: &[u32]) -> Option<Violation> {
        let target = next.target_counts(initial);
        for threat in &self.threats {
            for (bank, counts) in [(Side::Start, &next.counts), (Side::Target, &target)] {
                if !Threat::bank_ok(counts[threat.predator], counts[threat.prey]) {
                    return Some(Violation::Outnumbered {
                        step: number,
                        bank,
                        predator: self.config.species[threat.predator].name.clone(),
                        prey: self.config.species[threat.prey].name.clone(),
                    });
                }
            }
        }
        None
    }

    fn rejected(&self, steps_checked: usize, states: Vec<State>, violation: Violation) -> ValidationResult {
        ValidationResult {
            is_valid: false,
            steps_checked,
            states,
            violation: Some(violation),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Undecodable { line, message } => {
                write!(f, "Line {}: could not be read ({})", line, message)
            }
            Violation::PastFinal { step } => {
                write!(f, "Step {}: everyone has already crossed", step)
            }
            Violation::WrongDirection { step, shuttle_at } => write!(
                f,
                "Step {}: the shuttle is on the {} bank",
                step,
                shuttle_at.bank_text()
            ),
            Violation::EmptyTrip { step } => write!(f, "Step {}: no one is moved", step),
            Violation::OverCapacity { step, total, capacity } => write!(
                f,
                "Step {}: capacity violation - moving {} individuals, capacity is {}",
                step, total, capacity
            ),
            Violation::Insufficient {
                step,
                species,
                requested,
                available,
            } => write!(
                f,
                "Step {}: trying to move {} {}, only {} available",
                step, requested, species, available
            ),
            Violation::Outnumbered {
                step,
                bank,
                predator,
                prey,
            } => write!(
                f,
                "Step {}: {} outnumbered by {} on the {} bank",
                step,
                prey,
                predator,
                bank.bank_text()
            ),
            Violation::NotFinished { remaining } => {
                write!(f, "Final state: still on the left bank:")?;
                for (name, count) in remaining {
                    write!(f, " {} {}", count, name)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result: {}", if self.is_valid { "VALID" } else { "INVALID" })?;
        if let Some(ref violation) = self.violation {
            writeln!(f, "Error: {}", violation)?;
        }
        writeln!(f, "Steps checked: {}", self.steps_checked)?;
        writeln!(f, "States visited: {}", self.states.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{compile, SearchEngine};
    use crate::puzzle::{Relationship, Species};
    use proptest::prelude::*;

    fn guarded() -> PuzzleConfig {
        PuzzleConfig::new(
            vec![Species::new("a", 2), Species::new("b", 2)],
            vec![Relationship::new("b", "a")],
            2,
        )
    }

    const BEST: [&str; 5] = [
        "2 b cross left -> right",
        "1 b cross right -> left",
        "2 a cross left -> right",
        "1 b cross right -> left",
        "2 b cross left -> right",
    ];

    #[test]
    fn test_accepts_valid_solution() {
        let config = guarded();
        let result = SolutionValidator::new(&config).unwrap().validate(&BEST);
        assert!(result.is_valid, "{}", result);
        assert_eq!(result.steps_checked, 5);
        assert_eq!(result.states.len(), 6);
        assert!(result.states.last().unwrap().is_terminal());
    }

    #[test]
    fn test_reports_reasons() {
        let config = guarded();
        let validator = SolutionValidator::new(&config).unwrap();

        let result = validator.validate(&["1 a cross left -> right"]);
        assert!(matches!(
            result.violation,
            Some(Violation::Outnumbered { bank: Side::Start, .. })
        ));

        let result = validator.validate(&["2 a, 1 b cross left -> right"]);
        assert_eq!(
            result.violation,
            Some(Violation::OverCapacity { step: 1, total: 3, capacity: 2 })
        );

        let result = validator.validate(&["2 b cross left -> right", "1 a cross right -> left"]);
        assert!(matches!(result.violation, Some(Violation::Insufficient { step: 2, .. })));

        let result = validator.validate(&["2 b cross right -> left"]);
        assert!(matches!(result.violation, Some(Violation::WrongDirection { step: 1, .. })));

        let result = validator.validate(&["2 b cross up -> down"]);
        assert!(matches!(result.violation, Some(Violation::Undecodable { line: 1, .. })));

        let result = validator.validate(&BEST[..3]);
        assert!(matches!(result.violation, Some(Violation::NotFinished { .. })));
    }

    #[test]
    fn test_rejects_steps_after_final() {
        let config = guarded();
        let mut lines = BEST.to_vec();
        lines.push("1 b cross right -> left");
        lines.push("1 b cross left -> right");
        let result = SolutionValidator::new(&config).unwrap().validate(&lines);
        assert_eq!(result.violation, Some(Violation::PastFinal { step: 6 }));
    }

    #[test]
    fn test_display() {
        let config = guarded();
        let result = SolutionValidator::new(&config)
            .unwrap()
            .validate(&["2 a, 1 b cross left -> right"]);
        let text = result.to_string();
        assert!(text.contains("INVALID"));
        assert!(text.contains("capacity is 2"));
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        (0u32..3, 0u32..3, any::<bool>()).prop_map(|(a, b, forward)| {
            let mut parts = Vec::new();
            if a > 0 {
                parts.push(format!("{} a", a));
            }
            if b > 0 || a == 0 {
                parts.push(format!("{} b", b));
            }
            let direction = if forward { "left -> right" } else { "right -> left" };
            format!("{} cross {}", parts.join(", "), direction)
        })
    }

    proptest! {
        #[test]
        fn prop_agrees_with_engine(lines in prop::collection::vec(line_strategy(), 0..8)) {
            let config = guarded();
            let program = compile(&config).unwrap();
            let verified = SearchEngine::default().verify(&program, &config, &lines).unwrap();
            let validated = SolutionValidator::new(&config).unwrap().validate(&lines).is_valid;
            prop_assert_eq!(verified, validated);
        }
    }
}
